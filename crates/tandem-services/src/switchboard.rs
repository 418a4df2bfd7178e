//! The switchboard — one owned handle over registry, matchmaker and relay.
//!
//! Transport tasks talk only to this type: `connect` on accept, `handle` for
//! every parsed client event, `disconnect` when the socket closes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tandem_core::{ClientEvent, ConnId, ServerEvent, SessionId, SignalError};

use crate::matchmaker::{LeaveOutcome, Matchmaker};
use crate::registry::ConnectionRegistry;
use crate::relay::MessageRelay;
use crate::session::{Session, SessionManager};
use crate::stats::{Stats, StatsSnapshot};

#[derive(Clone)]
pub struct Switchboard {
    registry: ConnectionRegistry,
    sessions: SessionManager,
    matchmaker: Matchmaker,
    relay: MessageRelay,
    stats: Arc<Stats>,
}

impl Default for Switchboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Switchboard {
    pub fn new() -> Self {
        let stats = Arc::new(Stats::default());
        let registry = ConnectionRegistry::new(stats.clone());
        let sessions = SessionManager::new(registry.clone(), stats.clone());
        let matchmaker = Matchmaker::new(registry.clone(), sessions.clone());
        let relay = MessageRelay::new(sessions.clone(), stats.clone());
        Self {
            registry,
            sessions,
            matchmaker,
            relay,
            stats,
        }
    }

    /// Register a new transport. Events for it are pushed into `outbox`.
    pub fn connect(&self, outbox: mpsc::Sender<ServerEvent>) -> ConnId {
        let conn = self.registry.register(outbox);
        tracing::info!(conn = %conn, "connected");
        conn
    }

    /// Apply one client event. Rejected events count as dropped.
    ///
    /// Errors are never fatal to the connection; callers log and carry on.
    pub async fn handle(&self, conn: ConnId, event: ClientEvent) -> Result<(), SignalError> {
        let result = self.apply(conn, event).await;
        if result.is_err() {
            self.stats.event_dropped();
        }
        result
    }

    async fn apply(&self, conn: ConnId, event: ClientEvent) -> Result<(), SignalError> {
        match event {
            ClientEvent::RequestPairing => {
                self.matchmaker.request_pairing(conn).await?;
            }
            ClientEvent::LeaveSession => {
                self.matchmaker.leave(conn).await;
            }
            other => {
                if let Some(envelope) = other.into_envelope() {
                    self.relay.forward(conn, envelope)?;
                }
            }
        }
        Ok(())
    }

    /// Transport closed. The surviving peer, if any, is told once.
    pub async fn disconnect(&self, conn: ConnId) -> LeaveOutcome {
        let outcome = self.matchmaker.disconnect(conn).await;
        tracing::info!(conn = %conn, outcome = outcome_name(&outcome), "disconnected");
        outcome
    }

    /// Admin teardown; both members get `peer-disconnected`.
    pub async fn drop_session(&self, session_id: SessionId) -> Option<Session> {
        self.matchmaker.drop_session(session_id).await
    }

    pub fn session(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.get(session_id)
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.list()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub async fn waiting(&self) -> Vec<(ConnId, Duration)> {
        self.matchmaker.waiting().await
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Count an event rejected before it could be parsed.
    pub fn record_dropped(&self) {
        self.stats.event_dropped();
    }
}

fn outcome_name(outcome: &LeaveOutcome) -> &'static str {
    match outcome {
        LeaveOutcome::Idle => "idle",
        LeaveOutcome::LeftQueue => "left-queue",
        LeaveOutcome::LeftSession(_) => "left-session",
    }
}
