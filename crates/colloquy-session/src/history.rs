use colloquy_wire::Turn;

/// Ordered record of exchanged turns. Order is the only invariant; content
/// is never deduplicated. Rollback of a speculative append is a single
/// `pop`.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    turns: Vec<Turn>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<Turn> {
        self.turns.pop()
    }

    /// Snapshot of the ledger; callers cannot mutate through it.
    pub fn all(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn as_slice(&self) -> &[Turn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
