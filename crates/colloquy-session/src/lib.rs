//! Client-side session manager for the Colloquy conversation service.
//!
//! Owns the lifecycle of one logical conversation: the connection handshake,
//! turn exchange over monolithic or incremental responses, workflow stage
//! tracking, the sticky error latch, the conversation history ledger, and
//! cooperative cancellation of the in-flight exchange.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod gate;
pub mod history;
pub mod observer;
pub mod session;
pub mod state;

pub use cancel::*;
pub use config::*;
pub use errors::*;
pub use gate::*;
pub use history::*;
pub use observer::*;
pub use session::*;
pub use state::*;
