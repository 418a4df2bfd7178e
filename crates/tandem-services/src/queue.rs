//! FIFO waiting queue. Arrival order decides who gets matched first.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use tandem_core::ConnId;

/// Connections waiting for a partner, oldest first. No duplicates.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    order: VecDeque<(ConnId, Instant)>,
    members: HashSet<ConnId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns false if already queued.
    pub fn push(&mut self, id: ConnId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push_back((id, Instant::now()));
        true
    }

    /// Take the longest-waiting connection.
    pub fn pop_front(&mut self) -> Option<ConnId> {
        let (id, _) = self.order.pop_front()?;
        self.members.remove(&id);
        Some(id)
    }

    /// Remove wherever it sits. Safe to call for absent ids.
    pub fn remove(&mut self, id: ConnId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|(queued, _)| *queued != id);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Queued ids oldest first, with how long each has waited.
    pub fn snapshot(&self) -> Vec<(ConnId, Duration)> {
        self.order
            .iter()
            .map(|(id, since)| (*id, since.elapsed()))
            .collect()
    }
}
