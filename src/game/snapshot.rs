//! Snapshot building for network transmission
//!
//! Every tick sends the full state; there is no delta encoding.

use crate::ws::protocol::{BallSnapshot, PlayerSnapshot, ScoreSnapshot, ServerMsg, TimerSnapshot};

use super::ball::Ball;
use super::player::Player;
use super::room::Room;
use super::score::{MatchTimer, Score};

impl From<&Ball> for BallSnapshot {
    fn from(ball: &Ball) -> Self {
        Self {
            x: ball.pos.x,
            y: ball.pos.y,
            vx: ball.vel.x,
            vy: ball.vel.y,
            radius: ball.radius,
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            side: p.side,
            x: p.pos.x,
            y: p.pos.y,
            vx: p.vel.x,
            vy: p.vel.y,
            radius: p.radius,
        }
    }
}

impl From<Score> for ScoreSnapshot {
    fn from(score: Score) -> Self {
        Self {
            left: score.left,
            right: score.right,
        }
    }
}

impl From<&MatchTimer> for TimerSnapshot {
    fn from(timer: &MatchTimer) -> Self {
        Self {
            time_left: timer.remaining_secs(),
            formatted: timer.formatted(),
            is_finished: timer.is_finished(),
        }
    }
}

/// Build the `game_state` message for the room's current tick
pub fn game_state(room: &Room) -> ServerMsg {
    ServerMsg::GameState {
        ball: room.ball().into(),
        players: room.players().iter().map(PlayerSnapshot::from).collect(),
        score: room.score().into(),
        timer: room.timer().into(),
    }
}
