//! WebSocket transport: wire protocol, per-connection queues and sessions

pub mod gateway;
pub mod handler;
pub mod outbound;
pub mod protocol;
