//! Room handles, lifecycle and the registry of active rooms

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;
use uuid::Uuid;

use crate::ws::outbound::Outbound;
use crate::ws::protocol::{MatchWinner, ServerMsg, Side};

use super::score::Score;
use super::PlayerInput;

/// Room lifecycle. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Running,
    Ended,
}

/// Why a room ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The clock ran out
    TimeUp { winner: MatchWinner, score: Score },
    /// The connection on `side` went away
    Disconnected { side: Side },
    /// The simulation task failed
    Fault,
}

/// One connected participant of a room
#[derive(Debug, Clone)]
pub struct Seat {
    pub conn_id: Uuid,
    pub name: String,
    pub outbound: Outbound,
}

struct RoomShared {
    /// Held for a whole tick, so termination never lands mid-tick
    phase: Mutex<RoomPhase>,
    wake: Notify,
    inputs: [Mutex<PlayerInput>; 2],
    seats: [Seat; 2],
}

/// Handle to a running room, shared by the network path and the tick task
#[derive(Clone)]
pub struct RoomHandle {
    pub id: Uuid,
    shared: Arc<RoomShared>,
}

impl RoomHandle {
    /// `seats` are the left and right participants in that order
    pub fn new(id: Uuid, seats: [Seat; 2]) -> Self {
        Self {
            id,
            shared: Arc::new(RoomShared {
                phase: Mutex::new(RoomPhase::Running),
                wake: Notify::new(),
                inputs: Default::default(),
                seats,
            }),
        }
    }

    pub fn seat(&self, side: Side) -> &Seat {
        &self.shared.seats[side.index()]
    }

    pub fn seats(&self) -> &[Seat; 2] {
        &self.shared.seats
    }

    pub fn phase(&self) -> RoomPhase {
        *self.shared.phase.lock()
    }

    /// Replace a side's latest input
    pub fn set_input(&self, side: Side, input: PlayerInput) {
        *self.shared.inputs[side.index()].lock() = input;
    }

    pub fn latest_inputs(&self) -> [PlayerInput; 2] {
        [
            *self.shared.inputs[0].lock(),
            *self.shared.inputs[1].lock(),
        ]
    }

    /// Fire-and-forget delivery to both seats
    pub fn broadcast(&self, msg: &ServerMsg) {
        for seat in &self.shared.seats {
            seat.outbound.send(msg.clone());
        }
    }

    /// End the room. Only the first call has any effect; it emits the
    /// termination notices and wakes the tick task. Returns whether this
    /// call ended the room.
    pub fn terminate(&self, reason: EndReason) -> bool {
        let ended = {
            let mut phase = self.shared.phase.lock();
            self.end_locked(&mut phase, reason)
        };
        if ended {
            self.shared.wake.notify_one();
        }
        ended
    }

    /// Take the tick gate. The tick task holds it for a whole tick.
    pub(crate) fn lock_phase(&self) -> MutexGuard<'_, RoomPhase> {
        self.shared.phase.lock()
    }

    /// Termination with the tick gate already held
    pub(crate) fn end_locked(&self, phase: &mut RoomPhase, reason: EndReason) -> bool {
        if *phase == RoomPhase::Ended {
            return false;
        }
        *phase = RoomPhase::Ended;

        match reason {
            EndReason::TimeUp { winner, score } => {
                self.broadcast(&ServerMsg::GameOver {
                    winner,
                    score: score.into(),
                });
                info!(
                    room_id = %self.id,
                    ?winner,
                    left = score.left,
                    right = score.right,
                    "Match finished"
                );
            }
            EndReason::Disconnected { side } => {
                self.seat(side.opponent())
                    .outbound
                    .send(ServerMsg::OpponentDisconnected);
                info!(room_id = %self.id, ?side, "Match ended by disconnect");
            }
            EndReason::Fault => {
                self.broadcast(&ServerMsg::OpponentDisconnected);
                info!(room_id = %self.id, "Match torn down after fault");
            }
        }
        true
    }

    /// Resolves once the room has been terminated from outside the tick task
    pub(crate) async fn ended(&self) {
        self.shared.wake.notified().await;
    }
}

/// Registry of all active rooms
pub struct RoomRegistry {
    rooms: DashMap<Uuid, RoomHandle>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<RoomHandle> {
        self.rooms.get(id).map(|r| r.value().clone())
    }

    pub fn insert(&self, handle: RoomHandle) {
        self.rooms.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<RoomHandle> {
        self.rooms.remove(id).map(|(_, h)| h)
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Snapshot of every registered handle
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms.iter().map(|r| r.value().clone()).collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
