use colloquy_wire::Turn;
use std::sync::{Arc, Mutex};

/// Construction-time notification surface for session lifecycle events.
///
/// Every method defaults to a no-op so embedders implement only what they
/// render.
pub trait SessionObserver: Send + Sync {
    fn on_error(&self, _message: &str) {}

    /// Latest workflow stage reported by the server. Fires for every value
    /// the server sends, including zero.
    fn on_stage_change(&self, _stage: u32) {}

    /// Backlog of prior turns returned by the handshake.
    fn on_initial_messages(&self, _turns: &[Turn]) {}
}

#[derive(Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

#[derive(Clone, Debug, PartialEq)]
pub enum ObserverEvent {
    Error(String),
    StageChange(u32),
    InitialMessages(Vec<Turn>),
}

/// Observer that records every notification, for tests and embedders that
/// poll instead of reacting.
#[derive(Clone, Default)]
pub struct BufferedObserver {
    inner: Arc<Mutex<Vec<ObserverEvent>>>,
}

impl BufferedObserver {
    pub fn snapshot(&self) -> Vec<ObserverEvent> {
        let guard = self.inner.lock().expect("buffered observer mutex poisoned");
        guard.clone()
    }
}

impl SessionObserver for BufferedObserver {
    fn on_error(&self, message: &str) {
        let mut guard = self.inner.lock().expect("buffered observer mutex poisoned");
        guard.push(ObserverEvent::Error(message.to_string()));
    }

    fn on_stage_change(&self, stage: u32) {
        let mut guard = self.inner.lock().expect("buffered observer mutex poisoned");
        guard.push(ObserverEvent::StageChange(stage));
    }

    fn on_initial_messages(&self, turns: &[Turn]) {
        let mut guard = self.inner.lock().expect("buffered observer mutex poisoned");
        guard.push(ObserverEvent::InitialMessages(turns.to_vec()));
    }
}
