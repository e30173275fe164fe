//! Game simulation modules

pub mod ball;
pub mod field;
pub mod physics;
pub mod player;
pub mod registry;
pub mod room;
pub mod runner;
pub mod score;
pub mod snapshot;

pub use registry::{EndReason, RoomHandle, RoomPhase, RoomRegistry, Seat};
pub use room::Room;

/// Latest movement intent for one player. Each new message replaces the
/// previous one wholesale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub x: f32,
    pub y: f32,
    pub sprint: bool,
}
