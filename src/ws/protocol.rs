//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest display name kept, in characters
pub const MAX_NAME_CHARS: usize = 20;

/// Which goal a player defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Final result of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchWinner {
    Left,
    Right,
    Tie,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Ask to be paired with an opponent
    Join { name: String },

    /// Latest movement intent
    Input {
        /// Horizontal axis in [-1, 1]. Read at full width so huge
        /// values clamp instead of overflowing.
        x: f64,
        /// Vertical axis in [-1, 1]
        y: f64,
        #[serde(default)]
        sprint: bool,
    },
}

impl ClientMsg {
    /// Parse and validate a text frame
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let msg: ClientMsg = serde_json::from_str(text)?;
        match msg {
            ClientMsg::Join { name } => {
                let name: String = name.trim().chars().take(MAX_NAME_CHARS).collect();
                if name.is_empty() {
                    return Err(ProtocolError::EmptyName);
                }
                Ok(ClientMsg::Join { name })
            }
            ClientMsg::Input { x, y, sprint } => {
                if !x.is_finite() || !y.is_finite() {
                    return Err(ProtocolError::NonFiniteInput);
                }
                Ok(ClientMsg::Input {
                    x: x.clamp(-1.0, 1.0),
                    y: y.clamp(-1.0, 1.0),
                    sprint,
                })
            }
        }
    }
}

/// Rejected client payloads
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("input axis is not a finite number")]
    NonFiniteInput,

    #[error("display name is empty")]
    EmptyName,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Queued, no opponent yet
    WaitingForOpponent,

    /// Paired and the room is running
    GameStart {
        #[serde(rename = "roomId")]
        room_id: Uuid,
        side: Side,
        #[serde(rename = "opponentName")]
        opponent_name: String,
    },

    /// Full state snapshot, once per tick
    GameState {
        ball: BallSnapshot,
        players: Vec<PlayerSnapshot>,
        score: ScoreSnapshot,
        timer: TimerSnapshot,
    },

    /// Match finished on time
    GameOver {
        winner: MatchWinner,
        score: ScoreSnapshot,
    },

    /// The other seat left (or the room faulted)
    OpponentDisconnected,
}

/// Ball state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(rename = "timeLeft")]
    pub time_left: f64,
    pub formatted: String,
    #[serde(rename = "isFinished")]
    pub is_finished: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_join_and_trims_name() {
        let msg = ClientMsg::parse(r#"{"type":"join","name":"  Alice  "}"#).unwrap();
        assert!(matches!(msg, ClientMsg::Join { name } if name == "Alice"));
    }

    #[test]
    fn long_names_are_truncated() {
        let raw = json!({ "type": "join", "name": "x".repeat(64) }).to_string();
        match ClientMsg::parse(&raw).unwrap() {
            ClientMsg::Join { name } => assert_eq!(name.chars().count(), MAX_NAME_CHARS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = ClientMsg::parse(r#"{"type":"join","name":"   "}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::EmptyName));
    }

    #[test]
    fn input_is_clamped_and_sprint_defaults_off() {
        match ClientMsg::parse(r#"{"type":"input","x":3.0,"y":-0.5}"#).unwrap() {
            ClientMsg::Input { x, y, sprint } => {
                assert_eq!((x, y, sprint), (1.0, -0.5, false));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn huge_axis_values_clamp_like_small_ones() {
        match ClientMsg::parse(r#"{"type":"input","x":1e40,"y":-1e300}"#).unwrap() {
            ClientMsg::Input { x, y, .. } => assert_eq!((x, y), (1.0, -1.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(ClientMsg::parse("not json").is_err());
        assert!(ClientMsg::parse(r#"{"type":"input","x":"left","y":0}"#).is_err());
        assert!(ClientMsg::parse(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn server_messages_use_wire_names() {
        let start = ServerMsg::GameStart {
            room_id: Uuid::nil(),
            side: Side::Left,
            opponent_name: "Bob".into(),
        };
        let value = serde_json::to_value(&start).unwrap();
        assert_eq!(value["type"], "game_start");
        assert_eq!(value["side"], "left");
        assert_eq!(value["opponentName"], "Bob");
        assert!(value.get("roomId").is_some());

        let over = ServerMsg::GameOver {
            winner: MatchWinner::Tie,
            score: ScoreSnapshot { left: 0, right: 0 },
        };
        assert_eq!(
            serde_json::to_value(&over).unwrap(),
            json!({ "type": "game_over", "winner": "tie", "score": { "left": 0, "right": 0 } })
        );

        let waiting = serde_json::to_value(ServerMsg::WaitingForOpponent).unwrap();
        assert_eq!(waiting, json!({ "type": "waiting_for_opponent" }));
    }
}
