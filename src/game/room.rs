//! Room simulation: one match's field, ball, players, score and clock
//!
//! `Room::step` runs one fixed tick. It is synchronous and owns no channels;
//! scheduling and delivery live in [`super::runner`].

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::ws::protocol::{MatchWinner, Side};

use super::ball::Ball;
use super::field::Field;
use super::physics::{PhysicsSystem, Vec2, EPSILON};
use super::player::Player;
use super::score::{MatchTimer, Score};
use super::PlayerInput;

/// Corner recovery fires at or below this multiple of the ball's min speed
const CORNER_STALL_FACTOR: f32 = 1.5;
/// Each velocity component after a corner escape lies in this range
const CORNER_ESCAPE_SPEED: (f32, f32) = (1.0, 3.0);

/// What a tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Match continues; `goal` names the side credited this tick, if any
    Continue { goal: Option<Side> },
    /// The clock ran out on this tick
    TimeUp { winner: MatchWinner, score: Score },
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("simulation produced a non-finite {0} state")]
    NonFinite(&'static str),

    #[error("room clock already finished")]
    Finished,
}

/// Authoritative state of one match
pub struct Room {
    pub id: Uuid,
    config: Arc<GameConfig>,
    field: Field,
    ball: Ball,
    players: [Player; 2],
    score: Score,
    timer: MatchTimer,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Room {
    /// Build a room at kickoff. `seats` holds `(id, name)` for the left and
    /// right players in that order.
    pub fn new(id: Uuid, config: Arc<GameConfig>, seats: [(Uuid, String); 2], seed: u64) -> Self {
        let field = Field::new(&config.field);
        let ball = Ball::new(&config.ball, field.center());
        let [(left_id, left_name), (right_id, right_name)] = seats;
        let players = [
            Player::new(left_id, left_name, Side::Left, field.kickoff_position(Side::Left), &config.player),
            Player::new(right_id, right_name, Side::Right, field.kickoff_position(Side::Right), &config.player),
        ];
        let timer = MatchTimer::new(config.match_rules.duration_secs, config.match_rules.tick_rate);

        let mut room = Self {
            id,
            config,
            field,
            ball,
            players,
            score: Score::default(),
            timer,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        };
        room.kickoff();
        room
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    #[cfg(test)]
    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side.index()]
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn timer(&self) -> &MatchTimer {
        &self.timer
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Run one simulation tick with the latest input of each side
    pub fn step(&mut self, inputs: [PlayerInput; 2]) -> Result<TickOutcome, RoomError> {
        if !self.timer.is_running() {
            return Err(RoomError::Finished);
        }
        self.tick += 1;
        let config = self.config.clone();

        for (player, input) in self.players.iter_mut().zip(inputs) {
            player.input = input;
            player.apply_input(&config.player);
        }

        for player in self.players.iter_mut() {
            player.integrate();
        }
        self.ball.integrate(config.ball.friction);
        self.ball.limit_speed(&config.ball);

        self.resolve_walls(&config);
        self.unstick_from_corner(&config);
        self.resolve_player_contacts(&config);
        self.field.confine(&mut self.ball.pos, self.ball.radius);
        self.check_finite()?;

        let goal = self.field.goal_scored_by(self.ball.pos, self.ball.radius);
        if let Some(side) = goal {
            self.score.add_goal(side);
            self.kickoff();
        }

        if self.timer.advance() {
            return Ok(TickOutcome::TimeUp {
                winner: self.score.winner(),
                score: self.score,
            });
        }

        Ok(TickOutcome::Continue { goal })
    }

    /// Ball to center with a fresh velocity, players to their spots
    fn kickoff(&mut self) {
        self.ball.reset(self.field.center(), &mut self.rng);
        for player in self.players.iter_mut() {
            player.reset(self.field.kickoff_position(player.side));
        }
    }

    fn resolve_walls(&mut self, config: &GameConfig) {
        let ball = &mut self.ball;
        let hit = PhysicsSystem::reflect_off_walls(
            &mut ball.pos,
            &mut ball.vel,
            ball.radius,
            self.field.walls(),
            config.ball.wall_restitution,
        );
        if let Some(normal) = hit {
            let jitter = config.ball.wall_jitter;
            if jitter > 0.0 {
                let tangent = Vec2::new(-normal.y, normal.x);
                ball.vel += tangent * self.rng.gen_range(-jitter..=jitter);
                ball.vel = PhysicsSystem::clamp_speed(ball.vel, config.ball.max_speed);
            }
        }

        for player in self.players.iter_mut() {
            PhysicsSystem::reflect_off_walls(
                &mut player.pos,
                &mut player.vel,
                player.radius,
                self.field.solid_walls(),
                config.player.wall_restitution,
            );
        }
    }

    fn unstick_from_corner(&mut self, config: &GameConfig) {
        let threshold = self.ball.radius * 2.0;
        let Some((sx, sy)) = self.field.corner_escape(self.ball.pos, threshold) else {
            return;
        };
        if self.ball.speed() > config.ball.min_speed * CORNER_STALL_FACTOR {
            return;
        }
        let (min, max) = CORNER_ESCAPE_SPEED;
        self.ball.vel = Vec2::new(
            sx * self.rng.gen_range(min..=max),
            sy * self.rng.gen_range(min..=max),
        );
    }

    fn resolve_player_contacts(&mut self, config: &GameConfig) {
        let now_ms = self.timer.elapsed_ms();
        let max_ball_speed = config.ball.max_speed;

        for player in self.players.iter_mut() {
            let ball = &mut self.ball;
            let Some(contact) =
                PhysicsSystem::circle_contact(player.pos, player.radius, ball.pos, ball.radius)
            else {
                continue;
            };

            let carried = player.vel * config.ball.momentum_transfer;
            if let Some((player_vel, ball_vel)) = PhysicsSystem::resolve_impulse(
                player.mass,
                player.vel,
                ball.mass,
                ball.vel,
                contact.normal,
                ball.restitution,
            ) {
                player.vel = player_vel;
                ball.vel = ball_vel + carried;
            }
            ball.pos += contact.normal * contact.penetration;
            ball.vel = PhysicsSystem::clamp_speed(ball.vel, max_ball_speed);

            // Kick strength grows with the player's speed and how deep the
            // contact was before separation
            let speed = player.speed();
            if speed > EPSILON && player.can_kick(now_ms, config.player.kick_cooldown_ms) {
                let depth = contact.penetration / (player.radius + ball.radius);
                let power = (config.player.kick_power * (1.0 + speed / config.player.max_speed) * depth)
                    .min(max_ball_speed * config.ball.kick_cap_ratio);
                ball.vel += contact.normal * power;
                ball.vel = PhysicsSystem::clamp_speed(ball.vel, max_ball_speed);
                player.last_kick_ms = Some(now_ms);
            }
        }
    }

    fn check_finite(&self) -> Result<(), RoomError> {
        if !self.ball.pos.is_finite() || !self.ball.vel.is_finite() {
            return Err(RoomError::NonFinite("ball"));
        }
        if self
            .players
            .iter()
            .any(|p| !p.pos.is_finite() || !p.vel.is_finite())
        {
            return Err(RoomError::NonFinite("player"));
        }
        Ok(())
    }
}
