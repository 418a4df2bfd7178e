//! Error taxonomy for signaling input.
//!
//! Nothing here is fatal. Protocol errors come from malformed client input and
//! state errors from well-formed input that does not fit the connection's
//! current state; both are logged and dropped.

use crate::id::{ConnId, SessionId};

/// Coarse error class, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Protocol,
    State,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::Protocol => "protocol",
            ErrorClass::State => "state",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    // ── Protocol ─────────────────────────────────────────────────────────────
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid session id {0:?}")]
    InvalidSessionId(String),
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(&'static str),
    #[error("frame of {len} bytes exceeds limit of {max}")]
    Oversized { len: usize, max: usize },

    // ── State ────────────────────────────────────────────────────────────────
    #[error("unknown connection {0}")]
    UnknownConnection(ConnId),
    #[error("{0} is already waiting for a partner")]
    AlreadyWaiting(ConnId),
    #[error("{conn} is already paired in session {session}")]
    AlreadyPaired { conn: ConnId, session: SessionId },
    #[error("unknown or expired session {0}")]
    UnknownSession(SessionId),
    #[error("{conn} is not a member of session {session}")]
    NotMember { conn: ConnId, session: SessionId },
}

impl SignalError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SignalError::Malformed(_)
            | SignalError::InvalidSessionId(_)
            | SignalError::UnsupportedFrame(_)
            | SignalError::Oversized { .. } => ErrorClass::Protocol,
            _ => ErrorClass::State,
        }
    }
}
