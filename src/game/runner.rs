//! Fixed-rate tick loop driving one room

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::registry::{EndReason, RoomHandle, RoomPhase};
use super::room::{Room, TickOutcome};
use super::snapshot;

/// Run the authoritative tick loop until the room ends
pub async fn run(mut room: Room, handle: RoomHandle, tick_rate: u32) {
    info!(room_id = %handle.id, "Room started");

    let tick_duration = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
    let mut tick_interval = interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {}
            _ = handle.ended() => {}
        }

        if tick(&mut room, &handle).is_break() {
            break;
        }
    }

    info!(room_id = %room.id, ticks = room.tick(), "Room stopped");
}

/// One tick under the room's gate: check the phase, step, deliver
fn tick(room: &mut Room, handle: &RoomHandle) -> ControlFlow<()> {
    let mut phase = handle.lock_phase();
    if *phase == RoomPhase::Ended {
        return ControlFlow::Break(());
    }

    match room.step(handle.latest_inputs()) {
        Ok(TickOutcome::Continue { goal }) => {
            if let Some(side) = goal {
                let score = room.score();
                info!(
                    room_id = %handle.id,
                    ?side,
                    left = score.left,
                    right = score.right,
                    "Goal"
                );
            }
            handle.broadcast(&snapshot::game_state(room));
            ControlFlow::Continue(())
        }
        Ok(TickOutcome::TimeUp { winner, score }) => {
            handle.end_locked(&mut phase, EndReason::TimeUp { winner, score });
            ControlFlow::Break(())
        }
        Err(e) => {
            error!(room_id = %handle.id, error = %e, "Room tick failed");
            handle.end_locked(&mut phase, EndReason::Fault);
            ControlFlow::Break(())
        }
    }
}
