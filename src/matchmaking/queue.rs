//! Matchmaking queue implementation

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Connection waiting for an opponent
#[derive(Debug, Clone)]
pub struct WaitingEntry {
    pub conn_id: Uuid,
    pub name: String,
    pub queued_at: Instant,
}

impl WaitingEntry {
    pub fn new(conn_id: Uuid, name: String) -> Self {
        Self {
            conn_id,
            name,
            queued_at: Instant::now(),
        }
    }

    /// How long this connection has been waiting
    pub fn wait_time(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// Result of adding a connection to the queue
#[derive(Debug)]
pub enum Pairing {
    /// No opponent available; the connection is now queued
    Waiting,
    /// Paired with the oldest waiting connection, who takes the left side
    Matched {
        left: WaitingEntry,
        right: WaitingEntry,
    },
}

/// FIFO queue of connections waiting for a match
#[derive(Debug, Default)]
pub struct MatchQueue {
    queue: VecDeque<WaitingEntry>,
}

impl MatchQueue {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `entry` with the oldest other waiting connection, or queue it
    pub fn add_waiting(&mut self, entry: WaitingEntry) -> Pairing {
        // A connection is never paired with itself or queued twice
        self.queue.retain(|e| e.conn_id != entry.conn_id);

        match self.queue.pop_front() {
            Some(opponent) => Pairing::Matched {
                left: opponent,
                right: entry,
            },
            None => {
                self.queue.push_back(entry);
                Pairing::Waiting
            }
        }
    }

    /// Remove a connection from the queue; no-op if absent
    pub fn remove_waiting(&mut self, conn_id: Uuid) -> Option<WaitingEntry> {
        let pos = self.queue.iter().position(|e| e.conn_id == conn_id)?;
        self.queue.remove(pos)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
