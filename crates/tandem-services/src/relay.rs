//! Message relay — forwards session-scoped payloads to the other member.
//!
//! Bodies are never inspected. An envelope is forwarded under the same kind it
//! arrived with, to exactly one recipient, or dropped.

use std::sync::Arc;

use tandem_core::{ConnId, Envelope, RelayKind, SignalError};

use crate::session::SessionManager;
use crate::stats::Stats;

/// Where a relayed envelope went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutcome {
    pub to: ConnId,
    pub kind: RelayKind,
    /// False when the recipient's outbox was full or already closed.
    pub queued: bool,
}

#[derive(Clone)]
pub struct MessageRelay {
    sessions: SessionManager,
    stats: Arc<Stats>,
}

impl MessageRelay {
    pub fn new(sessions: SessionManager, stats: Arc<Stats>) -> Self {
        Self { sessions, stats }
    }

    pub fn forward(&self, sender: ConnId, envelope: Envelope) -> Result<RelayOutcome, SignalError> {
        let session_id = envelope.session_id;
        let kind = envelope.kind;

        let (to, queued) = self
            .sessions
            .relay(session_id, sender, envelope.into_server_event())?;

        if queued {
            self.stats.message_relayed();
        }
        tracing::debug!(
            session = %session_id,
            from = %sender,
            to = %to,
            kind = ?kind,
            queued,
            "relayed"
        );
        Ok(RelayOutcome { to, kind, queued })
    }
}
