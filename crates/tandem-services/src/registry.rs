//! Connection registry — every live signaling connection and its state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use tandem_core::{ConnId, ServerEvent, SessionId};

use crate::stats::Stats;

/// Where a connection is in its pairing cycle.
///
/// Mutated only while the matchmaking lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Idle,
    Waiting,
    Paired(SessionId),
}

/// Tracked state for one transport channel.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnId,
    /// Outbound events; drained by the connection's writer task.
    outbox: mpsc::Sender<ServerEvent>,
    pub state: ConnState,
}

impl Connection {
    /// The writer task is gone when the receiving half has been dropped.
    pub fn is_live(&self) -> bool {
        !self.outbox.is_closed()
    }
}

/// The connection registry — shared by the matchmaker, session manager and
/// transport tasks. Keyed on connection id.
#[derive(Clone)]
pub struct ConnectionRegistry {
    conns: Arc<DashMap<ConnId, Connection>>,
    next_id: Arc<AtomicU64>,
    stats: Arc<Stats>,
}

impl ConnectionRegistry {
    pub fn new(stats: Arc<Stats>) -> Self {
        Self {
            conns: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            stats,
        }
    }

    /// Track a new connection. It starts idle.
    pub fn register(&self, outbox: mpsc::Sender<ServerEvent>) -> ConnId {
        let id = ConnId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.conns.insert(
            id,
            Connection {
                id,
                outbox,
                state: ConnState::Idle,
            },
        );
        self.stats.connection_accepted();
        id
    }

    pub fn unregister(&self, id: ConnId) -> Option<Connection> {
        self.conns.remove(&id).map(|(_, conn)| conn)
    }

    /// Registered and its writer is still running.
    pub fn is_live(&self, id: ConnId) -> bool {
        self.conns.get(&id).map(|c| c.is_live()).unwrap_or(false)
    }

    pub fn state(&self, id: ConnId) -> Option<ConnState> {
        self.conns.get(&id).map(|c| c.state)
    }

    /// Returns false if the connection is not registered.
    pub fn set_state(&self, id: ConnId, state: ConnState) -> bool {
        match self.conns.get_mut(&id) {
            Some(mut conn) => {
                conn.state = state;
                true
            }
            None => false,
        }
    }

    /// Queue an event for a connection without waiting.
    ///
    /// Fire-and-forget: a full outbox drops the event, a closed one means the
    /// transport is already gone. Returns whether the event was queued.
    pub fn send(&self, id: ConnId, event: ServerEvent) -> bool {
        let outbox = match self.conns.get(&id) {
            Some(conn) => conn.outbox.clone(),
            None => return false,
        };
        match outbox.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                self.stats.event_dropped();
                tracing::warn!(conn = %id, event = event.name(), "outbox full, event dropped");
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::debug!(conn = %id, event = event.name(), "outbox closed");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// Count connections as (idle, waiting, paired).
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut idle = 0;
        let mut waiting = 0;
        let mut paired = 0;
        for entry in self.conns.iter() {
            match entry.value().state {
                ConnState::Idle => idle += 1,
                ConnState::Waiting => waiting += 1,
                ConnState::Paired(_) => paired += 1,
            }
        }
        (idle, waiting, paired)
    }
}
