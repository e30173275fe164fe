//! Per-connection outbound queue

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::protocol::ServerMsg;

/// Sending half of a connection's outbound queue.
///
/// Delivery never waits: a full or closed queue drops the message.
#[derive(Clone, Debug)]
pub struct Outbound {
    conn_id: Uuid,
    tx: mpsc::Sender<ServerMsg>,
}

impl Outbound {
    pub fn new(conn_id: Uuid, tx: mpsc::Sender<ServerMsg>) -> Self {
        Self { conn_id, tx }
    }

    /// Create a queue of `capacity` messages, returning both ends
    pub fn channel(conn_id: Uuid, capacity: usize) -> (Self, mpsc::Receiver<ServerMsg>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(conn_id, tx), rx)
    }

    pub fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    /// Queue a message; returns false if it was dropped
    pub fn send(&self, msg: ServerMsg) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(conn_id = %self.conn_id, "Outbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(conn_id = %self.conn_id, "Outbound queue closed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (out, mut rx) = Outbound::channel(Uuid::new_v4(), 1);
        assert!(out.send(ServerMsg::WaitingForOpponent));
        assert!(!out.send(ServerMsg::OpponentDisconnected));
        assert!(matches!(rx.try_recv(), Ok(ServerMsg::WaitingForOpponent)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_queue_reports_drop() {
        let (out, rx) = Outbound::channel(Uuid::new_v4(), 4);
        drop(rx);
        assert!(!out.send(ServerMsg::WaitingForOpponent));
    }
}
