//! Matchmaking: pairing waiting connections into rooms

pub mod queue;
pub mod service;

pub use service::MatchmakingService;
