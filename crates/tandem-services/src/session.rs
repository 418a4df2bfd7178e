//! Session management — tracks active two-member sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use tandem_core::{ConnId, ServerEvent, SessionId, SignalError};

use crate::registry::{ConnState, ConnectionRegistry};
use crate::stats::Stats;

/// An active pairing of exactly two connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    /// Waited longer; expected to send the first offer.
    pub initiator: ConnId,
    pub joiner: ConnId,
    pub created_at: Instant,
}

impl Session {
    pub fn members(&self) -> [ConnId; 2] {
        [self.initiator, self.joiner]
    }

    /// The other member, if `conn` is a member at all.
    pub fn peer_of(&self, conn: ConnId) -> Option<ConnId> {
        if conn == self.initiator {
            Some(self.joiner)
        } else if conn == self.joiner {
            Some(self.initiator)
        } else {
            None
        }
    }
}

type SessionTable = Arc<DashMap<SessionId, Session>>;

/// Creates, looks up and tears down sessions.
///
/// `create_session` and `teardown` must only be called with the matchmaking
/// lock held; `relay` needs no lock.
#[derive(Clone)]
pub struct SessionManager {
    sessions: SessionTable,
    registry: ConnectionRegistry,
    seq: Arc<AtomicU64>,
    stats: Arc<Stats>,
}

impl SessionManager {
    pub fn new(registry: ConnectionRegistry, stats: Arc<Stats>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            registry,
            seq: Arc::new(AtomicU64::new(0)),
            stats,
        }
    }

    /// Pair two idle, live connections. `initiator` is the one that waited.
    pub fn create_session(&self, initiator: ConnId, joiner: ConnId) -> Session {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let session = Session {
            id: SessionId::derive(initiator, joiner, seq),
            initiator,
            joiner,
            created_at: Instant::now(),
        };
        self.sessions.insert(session.id, session.clone());

        for member in session.members() {
            self.registry
                .set_state(member, ConnState::Paired(session.id));
            self.registry.send(
                member,
                ServerEvent::Matched {
                    session_id: session.id,
                },
            );
        }
        self.registry.send(
            initiator,
            ServerEvent::InitiatorAssigned { is_initiator: true },
        );

        self.stats.session_created();
        tracing::info!(
            session = %session.id,
            initiator = %initiator,
            joiner = %joiner,
            "session created"
        );
        session
    }

    /// Forward `event` from `sender` to the other member of `session_id`.
    ///
    /// Returns the recipient and whether the event was queued for it.
    pub fn relay(
        &self,
        session_id: SessionId,
        sender: ConnId,
        event: ServerEvent,
    ) -> Result<(ConnId, bool), SignalError> {
        let session = self
            .sessions
            .get(&session_id)
            .ok_or(SignalError::UnknownSession(session_id))?;
        let peer = session.peer_of(sender).ok_or(SignalError::NotMember {
            conn: sender,
            session: session_id,
        })?;
        // The entry stays borrowed until the send is queued, so a concurrent
        // teardown cannot remove it first and get its notification ahead of this event.
        let queued = self.registry.send(peer, event);
        drop(session);
        Ok((peer, queued))
    }

    /// Remove a session and return both members to idle.
    ///
    /// Every member except `departing` receives `peer-disconnected`; with no
    /// departing member both are notified. Returns `None` if the session was
    /// already gone, in which case nobody is notified.
    pub fn teardown(&self, session_id: SessionId, departing: Option<ConnId>) -> Option<Session> {
        let (_, session) = self.sessions.remove(&session_id)?;

        for member in session.members() {
            self.registry.set_state(member, ConnState::Idle);
            if Some(member) != departing {
                self.registry.send(member, ServerEvent::PeerDisconnected);
            }
        }

        tracing::info!(
            session = %session.id,
            departing = ?departing.map(|c| c.to_string()),
            age_secs = session.created_at.elapsed().as_secs(),
            "session ended"
        );
        Some(session)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    pub fn list(&self) -> Vec<Session> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
