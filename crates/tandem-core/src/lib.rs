//! tandem-core — shared identifiers, wire protocol, error taxonomy, and config.
//! All other Tandem crates depend on this one.

pub mod config;
pub mod error;
pub mod id;
pub mod protocol;

pub use error::{ErrorClass, SignalError};
pub use id::{ConnId, SessionId};
pub use protocol::{ClientEvent, Envelope, RelayKind, ServerEvent};
