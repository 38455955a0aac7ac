//! Wire layer for the Colloquy conversation service.
//!
//! Request and response shapes shared by both phases of the exchange, the
//! incremental record decoder, the transport seam the session manager talks
//! through, and the HTTP implementation of that seam.

pub mod decode;
pub mod errors;
pub mod transport;
pub mod types;

pub use decode::*;
pub use errors::*;
pub use transport::*;
pub use types::*;
