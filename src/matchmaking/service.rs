//! Matchmaking service - owns the waiting queue, connection membership and
//! room creation

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::game::{runner, EndReason, PlayerInput, Room, RoomHandle, RoomPhase, RoomRegistry, Seat};
use crate::ws::outbound::Outbound;
use crate::ws::protocol::{ServerMsg, Side};

use super::queue::{MatchQueue, Pairing, WaitingEntry};

/// Where a connection currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Unmatched,
    Queued,
    InRoom { room_id: Uuid, side: Side },
}

struct Connection {
    outbound: Outbound,
    membership: Membership,
}

/// Queue and membership, always changed together under one lock
#[derive(Default)]
struct Lobby {
    queue: MatchQueue,
    connections: HashMap<Uuid, Connection>,
}

impl Lobby {
    /// Return a room's seats to `Unmatched` if they still point at it
    fn release_seats(&mut self, handle: &RoomHandle) {
        for seat in handle.seats() {
            if let Some(conn) = self.connections.get_mut(&seat.conn_id) {
                if matches!(conn.membership, Membership::InRoom { room_id, .. } if room_id == handle.id) {
                    conn.membership = Membership::Unmatched;
                }
            }
        }
    }
}

/// Matchmaking service
pub struct MatchmakingService {
    lobby: Arc<Mutex<Lobby>>,
    registry: Arc<RoomRegistry>,
    config: Arc<GameConfig>,
    rng_seed: Option<u64>,
    rooms_created: AtomicU64,
}

impl MatchmakingService {
    pub fn new(config: Arc<GameConfig>, registry: Arc<RoomRegistry>, rng_seed: Option<u64>) -> Self {
        Self {
            lobby: Arc::new(Mutex::new(Lobby::default())),
            registry,
            config,
            rng_seed,
            rooms_created: AtomicU64::new(0),
        }
    }

    /// Register a new connection as `Unmatched`
    pub fn connect(&self, outbound: Outbound) {
        let conn_id = outbound.conn_id();
        self.lobby.lock().connections.insert(
            conn_id,
            Connection {
                outbound,
                membership: Membership::Unmatched,
            },
        );
        info!(conn_id = %conn_id, "Connection registered");
    }

    /// Queue a connection or pair it into a new room. Ignored unless the
    /// connection is `Unmatched` or its room has already ended.
    pub fn join(&self, conn_id: Uuid, name: String) {
        let mut lobby = self.lobby.lock();

        let outbound = match lobby.connections.get(&conn_id) {
            Some(conn) if conn.membership == Membership::Unmatched => conn.outbound.clone(),
            Some(conn) if self.room_ended(conn.membership) => {
                debug!(conn_id = %conn_id, "Rejoining before room cleanup");
                conn.outbound.clone()
            }
            Some(conn) => {
                debug!(conn_id = %conn_id, membership = ?conn.membership, "Join ignored");
                return;
            }
            None => {
                debug!(conn_id = %conn_id, "Join from unknown connection");
                return;
            }
        };

        match lobby.queue.add_waiting(WaitingEntry::new(conn_id, name)) {
            Pairing::Waiting => {
                if let Some(conn) = lobby.connections.get_mut(&conn_id) {
                    conn.membership = Membership::Queued;
                }
                outbound.send(ServerMsg::WaitingForOpponent);
                info!(conn_id = %conn_id, queue_size = lobby.queue.len(), "Waiting for opponent");
            }
            Pairing::Matched { left, right } => {
                debug!(
                    left = %left.conn_id,
                    waited_ms = left.wait_time().as_millis() as u64,
                    "Paired with waiting connection"
                );
                self.start_room(&mut lobby, left, right);
            }
        }
    }

    /// Store the latest input for a connection that's in a room
    pub fn submit_input(&self, conn_id: Uuid, input: PlayerInput) {
        let membership = self
            .lobby
            .lock()
            .connections
            .get(&conn_id)
            .map(|c| c.membership);

        match membership {
            Some(Membership::InRoom { room_id, side }) => {
                if let Some(handle) = self.registry.get(&room_id) {
                    handle.set_input(side, input);
                }
            }
            _ => debug!(conn_id = %conn_id, "Input outside a room ignored"),
        }
    }

    /// Forget a connection. A queued connection leaves the queue; a seated
    /// one ends its room at once. Repeated calls do nothing.
    pub fn disconnect(&self, conn_id: Uuid) {
        let mut lobby = self.lobby.lock();
        let Some(conn) = lobby.connections.remove(&conn_id) else {
            return;
        };

        match conn.membership {
            Membership::Unmatched => {}
            Membership::Queued => {
                lobby.queue.remove_waiting(conn_id);
            }
            Membership::InRoom { room_id, side } => {
                if let Some(handle) = self.registry.remove(&room_id) {
                    handle.terminate(EndReason::Disconnected { side });
                    lobby.release_seats(&handle);
                }
            }
        }

        info!(conn_id = %conn_id, "Connection closed");
    }

    /// End every running room, e.g. on shutdown
    pub fn shutdown(&self) {
        let mut lobby = self.lobby.lock();
        for handle in self.registry.handles() {
            handle.terminate(EndReason::Fault);
            self.registry.remove(&handle.id);
            lobby.release_seats(&handle);
        }
    }

    #[cfg(test)]
    pub fn membership(&self, conn_id: &Uuid) -> Option<Membership> {
        self.lobby.lock().connections.get(conn_id).map(|c| c.membership)
    }

    pub fn queue_size(&self) -> usize {
        self.lobby.lock().queue.len()
    }

    pub fn connection_count(&self) -> usize {
        self.lobby.lock().connections.len()
    }

    /// Whether a seat points at a room that's over but not yet cleaned up
    fn room_ended(&self, membership: Membership) -> bool {
        match membership {
            Membership::InRoom { room_id, .. } => self
                .registry
                .get(&room_id)
                .map_or(true, |handle| handle.phase() == RoomPhase::Ended),
            _ => false,
        }
    }

    /// Seed for the next room's random source
    fn next_seed(&self) -> u64 {
        match self.rng_seed {
            Some(base) => base.wrapping_add(self.rooms_created.fetch_add(1, Ordering::Relaxed)),
            None => {
                self.rooms_created.fetch_add(1, Ordering::Relaxed);
                rand::random()
            }
        }
    }

    /// Build, register and spawn a room for two paired connections
    fn start_room(&self, lobby: &mut Lobby, left: WaitingEntry, right: WaitingEntry) {
        let seat_for = |entry: &WaitingEntry| {
            lobby.connections.get(&entry.conn_id).map(|c| Seat {
                conn_id: entry.conn_id,
                name: entry.name.clone(),
                outbound: c.outbound.clone(),
            })
        };
        let (Some(left_seat), Some(right_seat)) = (seat_for(&left), seat_for(&right)) else {
            // Queue entries are removed under the same lock as connections
            warn!("Paired connection vanished before room creation");
            return;
        };

        let room_id = Uuid::new_v4();
        let room = Room::new(
            room_id,
            self.config.clone(),
            [
                (left_seat.conn_id, left_seat.name.clone()),
                (right_seat.conn_id, right_seat.name.clone()),
            ],
            self.next_seed(),
        );
        let handle = RoomHandle::new(room_id, [left_seat, right_seat]);
        self.registry.insert(handle.clone());

        for side in [Side::Left, Side::Right] {
            let seat = handle.seat(side);
            if let Some(conn) = lobby.connections.get_mut(&seat.conn_id) {
                conn.membership = Membership::InRoom { room_id, side };
            }
            seat.outbound.send(ServerMsg::GameStart {
                room_id,
                side,
                opponent_name: handle.seat(side.opponent()).name.clone(),
            });
        }

        info!(
            room_id = %room_id,
            left = %handle.seat(Side::Left).name,
            right = %handle.seat(Side::Right).name,
            "Created new room"
        );

        let lobby = self.lobby.clone();
        let registry = self.registry.clone();
        let tick_rate = self.config.match_rules.tick_rate;

        tokio::spawn(async move {
            let task = tokio::spawn(runner::run(room, handle.clone(), tick_rate));
            if let Err(e) = task.await {
                error!(room_id = %room_id, error = %e, "Room task aborted");
                handle.terminate(EndReason::Fault);
            }

            // Cleanup after the room ends
            registry.remove(&room_id);
            lobby.lock().release_seats(&handle);

            info!(room_id = %room_id, "Room removed from registry");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::score::Score;
    use crate::ws::protocol::MatchWinner;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct Client {
        id: Uuid,
        rx: mpsc::Receiver<ServerMsg>,
    }

    impl Client {
        fn drain(&mut self) -> Vec<ServerMsg> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }
    }

    fn service(duration_secs: u32) -> (MatchmakingService, Arc<RoomRegistry>) {
        let mut config = GameConfig::default();
        config.match_rules.duration_secs = duration_secs;
        let registry = Arc::new(RoomRegistry::new());
        (
            MatchmakingService::new(Arc::new(config), registry.clone(), Some(7)),
            registry,
        )
    }

    fn connect(service: &MatchmakingService) -> Client {
        let id = Uuid::new_v4();
        let (outbound, rx) = Outbound::channel(id, 8192);
        service.connect(outbound);
        Client { id, rx }
    }

    fn start_match(service: &MatchmakingService) -> (Client, Client, Uuid) {
        let mut alice = connect(service);
        let mut bob = connect(service);
        service.join(alice.id, "Alice".into());
        service.join(bob.id, "Bob".into());

        let room_id = match alice.drain().pop() {
            Some(ServerMsg::GameStart { room_id, .. }) => room_id,
            other => panic!("expected game_start, got {other:?}"),
        };
        bob.drain();
        (alice, bob, room_id)
    }

    #[tokio::test(start_paused = true)]
    async fn second_join_starts_a_room() {
        let (service, registry) = service(120);
        let mut alice = connect(&service);
        let mut bob = connect(&service);

        service.join(alice.id, "Alice".into());
        assert!(matches!(alice.drain().as_slice(), [ServerMsg::WaitingForOpponent]));
        assert_eq!(service.membership(&alice.id), Some(Membership::Queued));

        service.join(bob.id, "Bob".into());

        let a = alice.drain();
        let b = bob.drain();
        let (
            ServerMsg::GameStart { room_id: a_room, side: a_side, opponent_name: a_opp },
            ServerMsg::GameStart { room_id: b_room, side: b_side, opponent_name: b_opp },
        ) = (&a[0], &b[0])
        else {
            panic!("expected game_start for both, got {a:?} / {b:?}");
        };
        assert_eq!(a_room, b_room);
        assert_eq!((*a_side, *b_side), (Side::Left, Side::Right));
        assert_eq!((a_opp.as_str(), b_opp.as_str()), ("Bob", "Alice"));
        assert!(registry.get(a_room).is_some());
        assert_eq!(service.queue_size(), 0);
        assert_eq!(
            service.membership(&bob.id),
            Some(Membership::InRoom { room_id: *a_room, side: Side::Right })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_join_is_ignored() {
        let (service, _registry) = service(120);
        let mut alice = connect(&service);

        service.join(alice.id, "Alice".into());
        service.join(alice.id, "Alice".into());

        assert_eq!(alice.drain().len(), 1);
        assert_eq!(service.queue_size(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rooms_broadcast_state_every_tick() {
        let (service, _registry) = service(120);
        let (mut alice, mut bob, _room_id) = start_match(&service);

        tokio::time::sleep(Duration::from_millis(500)).await;

        for client in [&mut alice, &mut bob] {
            let states = client
                .drain()
                .into_iter()
                .filter(|m| matches!(m, ServerMsg::GameState { .. }))
                .count();
            assert!(states >= 29, "only {states} snapshots");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn input_moves_the_player() {
        let (service, _registry) = service(120);
        let (mut alice, _bob, _room_id) = start_match(&service);

        service.submit_input(alice.id, PlayerInput { x: 0.0, y: -1.0, sprint: false });
        tokio::time::sleep(Duration::from_millis(200)).await;

        let last_state = alice
            .drain()
            .into_iter()
            .rev()
            .find(|m| matches!(m, ServerMsg::GameState { .. }));
        let Some(ServerMsg::GameState { players, .. }) = last_state else {
            panic!("no snapshot received");
        };
        let me = players.iter().find(|p| p.id == alice.id).unwrap();
        assert!(me.y < 300.0);
        assert_eq!(me.side, Side::Left);
    }

    #[tokio::test(start_paused = true)]
    async fn orphan_input_is_ignored() {
        let (service, registry) = service(120);
        let alice = connect(&service);
        service.submit_input(alice.id, PlayerInput { x: 1.0, y: 0.0, sprint: false });
        service.submit_input(Uuid::new_v4(), PlayerInput::default());
        assert_eq!(service.membership(&alice.id), Some(Membership::Unmatched));
        assert_eq!(registry.active_rooms(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_while_queued_leaves_queue() {
        let (service, _registry) = service(120);
        let alice = connect(&service);
        service.join(alice.id, "Alice".into());
        assert_eq!(service.queue_size(), 1);

        service.disconnect(alice.id);
        assert_eq!(service.queue_size(), 0);
        assert_eq!(service.connection_count(), 0);

        // A newcomer must not be paired with the departed connection
        let mut bob = connect(&service);
        service.join(bob.id, "Bob".into());
        assert!(matches!(bob.drain().as_slice(), [ServerMsg::WaitingForOpponent]));
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_mid_match_notifies_opponent_once() {
        let (service, registry) = service(120);
        let (alice, mut bob, room_id) = start_match(&service);
        let alice_id = alice.id;

        tokio::time::sleep(Duration::from_millis(100)).await;
        service.disconnect(alice_id);

        assert!(registry.get(&room_id).is_none());
        assert_eq!(service.membership(&bob.id), Some(Membership::Unmatched));

        // Repeated signals change nothing
        service.disconnect(alice_id);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let msgs = bob.drain();
        let notices = msgs
            .iter()
            .filter(|m| matches!(m, ServerMsg::OpponentDisconnected))
            .count();
        assert_eq!(notices, 1);
        assert!(matches!(msgs.last(), Some(ServerMsg::OpponentDisconnected)));
        assert_eq!(registry.active_rooms(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn time_up_ends_room_and_frees_players() {
        let (service, registry) = service(1);
        let (mut alice, mut bob, room_id) = start_match(&service);

        tokio::time::sleep(Duration::from_secs(2)).await;

        for client in [&mut alice, &mut bob] {
            let msgs = client.drain();
            let overs = msgs
                .iter()
                .filter(|m| matches!(m, ServerMsg::GameOver { .. }))
                .count();
            assert_eq!(overs, 1);
            assert!(matches!(msgs.last(), Some(ServerMsg::GameOver { .. })));
        }
        assert!(registry.get(&room_id).is_none());
        assert_eq!(service.membership(&alice.id), Some(Membership::Unmatched));

        // Both may queue again
        service.join(alice.id, "Alice".into());
        assert!(matches!(alice.drain().as_slice(), [ServerMsg::WaitingForOpponent]));
    }

    #[tokio::test(start_paused = true)]
    async fn join_right_after_game_over_is_accepted() {
        let (service, registry) = service(120);
        let (mut alice, _bob, room_id) = start_match(&service);

        let handle = registry.get(&room_id).unwrap();
        handle.terminate(EndReason::TimeUp {
            winner: MatchWinner::Tie,
            score: Score::default(),
        });
        // The room task hasn't run its cleanup yet
        assert!(matches!(
            service.membership(&alice.id),
            Some(Membership::InRoom { .. })
        ));

        service.join(alice.id, "Alice".into());
        assert!(matches!(alice.drain().last(), Some(ServerMsg::WaitingForOpponent)));
        assert_eq!(service.membership(&alice.id), Some(Membership::Queued));

        // Cleanup leaves the new membership alone
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(service.membership(&alice.id), Some(Membership::Queued));
        assert_eq!(service.queue_size(), 1);
        assert!(registry.get(&room_id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn faulted_room_is_torn_down_alone() {
        let (service, registry) = service(120);
        let (mut alice, mut bob, faulty_room) = start_match(&service);
        let (mut carol, _dave, healthy_room) = start_match(&service);

        // Input that skipped protocol validation poisons the simulation
        service.submit_input(alice.id, PlayerInput { x: f32::NAN, y: 0.0, sprint: false });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(registry.get(&faulty_room).is_none());
        for client in [&mut alice, &mut bob] {
            let msgs = client.drain();
            let notices = msgs
                .iter()
                .filter(|m| matches!(m, ServerMsg::OpponentDisconnected))
                .count();
            assert_eq!(notices, 1);
            assert!(matches!(msgs.last(), Some(ServerMsg::OpponentDisconnected)));
            assert_eq!(service.membership(&client.id), Some(Membership::Unmatched));
        }

        assert!(registry.get(&healthy_room).is_some());
        carol.drain();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(carol
            .drain()
            .iter()
            .any(|m| matches!(m, ServerMsg::GameState { .. })));
        assert!(matches!(
            service.membership(&carol.id),
            Some(Membership::InRoom { room_id, .. }) if room_id == healthy_room
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_ends_every_room() {
        let (service, registry) = service(120);
        let (mut alice, mut bob, _room_id) = start_match(&service);

        service.shutdown();

        assert_eq!(registry.active_rooms(), 0);
        for client in [&mut alice, &mut bob] {
            assert!(matches!(client.drain().last(), Some(ServerMsg::OpponentDisconnected)));
        }
    }
}
