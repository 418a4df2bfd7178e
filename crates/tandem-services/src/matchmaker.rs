//! Matchmaking — FIFO pairing, leaving, and session teardown.
//!
//! Everything that changes queue or session membership runs under one async
//! mutex around the waiting queue. Connection states are only written while it
//! is held, so two concurrent requests can never claim the same waiter and a
//! departure is processed exactly once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use tandem_core::{ConnId, ServerEvent, SessionId, SignalError};

use crate::queue::WaitingQueue;
use crate::registry::{ConnState, ConnectionRegistry};
use crate::session::{Session, SessionManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// Queued; no live partner was waiting.
    Waiting,
    /// Paired with the longest-waiting live connection.
    Matched(Session),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Was not waiting or paired. Nothing changed.
    Idle,
    LeftQueue,
    LeftSession(Session),
}

#[derive(Clone)]
pub struct Matchmaker {
    queue: Arc<Mutex<WaitingQueue>>,
    registry: ConnectionRegistry,
    sessions: SessionManager,
}

impl Matchmaker {
    pub fn new(registry: ConnectionRegistry, sessions: SessionManager) -> Self {
        Self {
            queue: Arc::new(Mutex::new(WaitingQueue::new())),
            registry,
            sessions,
        }
    }

    /// Pair `conn` with the oldest live waiter, or queue it.
    ///
    /// Waiting or paired connections get a state error and nothing changes.
    pub async fn request_pairing(&self, conn: ConnId) -> Result<PairingOutcome, SignalError> {
        let mut queue = self.queue.lock().await;

        match self.registry.state(conn) {
            None => return Err(SignalError::UnknownConnection(conn)),
            Some(ConnState::Waiting) => return Err(SignalError::AlreadyWaiting(conn)),
            Some(ConnState::Paired(session)) => {
                return Err(SignalError::AlreadyPaired { conn, session })
            }
            Some(ConnState::Idle) => {}
        }

        while let Some(candidate) = queue.pop_front() {
            if !self.registry.is_live(candidate) {
                // Transport gone, disconnect not yet processed.
                self.registry.set_state(candidate, ConnState::Idle);
                tracing::debug!(conn = %candidate, "discarded stale waiter");
                continue;
            }
            let session = self.sessions.create_session(candidate, conn);
            return Ok(PairingOutcome::Matched(session));
        }

        queue.push(conn);
        self.registry.set_state(conn, ConnState::Waiting);
        self.registry.send(conn, ServerEvent::Waiting);
        tracing::info!(conn = %conn, queued = queue.len(), "waiting for partner");
        Ok(PairingOutcome::Waiting)
    }

    /// Leave the current session or the queue. Idle connections are a no-op.
    pub async fn leave(&self, conn: ConnId) -> LeaveOutcome {
        let mut queue = self.queue.lock().await;
        self.leave_locked(&mut queue, conn)
    }

    /// Transport closed: leave, then forget the connection.
    pub async fn disconnect(&self, conn: ConnId) -> LeaveOutcome {
        let mut queue = self.queue.lock().await;
        let outcome = self.leave_locked(&mut queue, conn);
        self.registry.unregister(conn);
        outcome
    }

    /// Tear down a session from outside; both members are notified.
    pub async fn drop_session(&self, session_id: SessionId) -> Option<Session> {
        let _queue = self.queue.lock().await;
        self.sessions.teardown(session_id, None)
    }

    /// Waiting connections oldest first.
    pub async fn waiting(&self) -> Vec<(ConnId, Duration)> {
        self.queue.lock().await.snapshot()
    }

    fn leave_locked(&self, queue: &mut WaitingQueue, conn: ConnId) -> LeaveOutcome {
        match self.registry.state(conn) {
            Some(ConnState::Paired(session_id)) => {
                match self.sessions.teardown(session_id, Some(conn)) {
                    Some(session) => LeaveOutcome::LeftSession(session),
                    None => {
                        self.registry.set_state(conn, ConnState::Idle);
                        LeaveOutcome::Idle
                    }
                }
            }
            Some(ConnState::Waiting) => {
                self.dequeue_locked(queue, conn);
                tracing::info!(conn = %conn, "left waiting queue");
                LeaveOutcome::LeftQueue
            }
            Some(ConnState::Idle) | None => LeaveOutcome::Idle,
        }
    }

    /// Take `conn` out of the queue and mark it idle. Absent ids change nothing.
    fn dequeue_locked(&self, queue: &mut WaitingQueue, conn: ConnId) -> bool {
        if !queue.remove(conn) {
            return false;
        }
        self.registry.set_state(conn, ConnState::Idle);
        true
    }
}
