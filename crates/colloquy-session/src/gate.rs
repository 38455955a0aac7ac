/// Sticky failure latch. Once tripped it suppresses further automatic
/// connection attempts and duplicate notifications until the caller
/// explicitly clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LatchState {
    #[default]
    Clear,
    Tripped(String),
}

#[derive(Debug, Default)]
pub struct ErrorLatch {
    state: LatchState,
}

impl ErrorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the latch. Returns true only when this call moved it from clear
    /// to tripped; repeat failures while tripped are absorbed and the
    /// original message is kept.
    pub fn trip(&mut self, message: impl Into<String>) -> bool {
        match self.state {
            LatchState::Clear => {
                self.state = LatchState::Tripped(message.into());
                true
            }
            LatchState::Tripped(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.state = LatchState::Clear;
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self.state, LatchState::Tripped(_))
    }

    pub fn message(&self) -> Option<&str> {
        match &self.state {
            LatchState::Clear => None,
            LatchState::Tripped(message) => Some(message),
        }
    }
}
