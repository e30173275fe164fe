//! Per-connection session: validates client frames and routes them to
//! matchmaking or the player's room

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::game::PlayerInput;
use crate::matchmaking::MatchmakingService;
use crate::util::rate_limit::SessionRateLimiter;

use super::outbound::Outbound;
use super::protocol::ClientMsg;

/// One live connection. Dropping it is the disconnect signal.
pub struct Session {
    conn_id: Uuid,
    service: Arc<MatchmakingService>,
    rate_limiter: SessionRateLimiter,
}

impl Session {
    /// Register the connection as unmatched
    pub fn open(service: Arc<MatchmakingService>, outbound: Outbound) -> Self {
        let conn_id = outbound.conn_id();
        service.connect(outbound);
        Self {
            conn_id,
            service,
            rate_limiter: SessionRateLimiter::new(),
        }
    }

    #[cfg(test)]
    pub fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    /// Handle one inbound text frame. Invalid or excess frames are dropped.
    pub fn handle_text(&self, text: &str) {
        if !self.rate_limiter.check() {
            warn!(conn_id = %self.conn_id, "Rate limited client message");
            return;
        }

        match ClientMsg::parse(text) {
            Ok(msg) => self.dispatch(msg),
            Err(e) => {
                debug!(conn_id = %self.conn_id, error = %e, "Dropped invalid client message");
            }
        }
    }

    fn dispatch(&self, msg: ClientMsg) {
        match msg {
            ClientMsg::Join { name } => self.service.join(self.conn_id, name),
            ClientMsg::Input { x, y, sprint } => {
                let input = PlayerInput {
                    x: x as f32,
                    y: y as f32,
                    sprint,
                };
                self.service.submit_input(self.conn_id, input);
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.service.disconnect(self.conn_id);
    }
}
