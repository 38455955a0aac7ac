use colloquy_wire::WireError;
use thiserror::Error;

/// Top-level error type for the colloquy-session crate.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The service reported a failure inside an otherwise valid response.
    #[error("{0}")]
    Server(String),
    #[error("invalid connection state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl SessionError {
    /// Message surfaced through the error observable and `on_error`.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
