//! Player avatar state and movement

use uuid::Uuid;

use crate::config::PlayerConfig;
use crate::ws::protocol::Side;

use super::physics::{PhysicsSystem, Vec2};
use super::PlayerInput;

/// Velocity components below this snap to zero
const STOP_EPSILON: f32 = 0.01;

/// Player state in a room (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub input: PlayerInput,
    /// Simulation time of the last kick, in milliseconds
    pub last_kick_ms: Option<f64>,
}

impl Player {
    pub fn new(id: Uuid, name: String, side: Side, spawn: Vec2, config: &PlayerConfig) -> Self {
        Self {
            id,
            name,
            side,
            pos: spawn,
            vel: Vec2::ZERO,
            radius: config.radius,
            mass: config.mass,
            input: PlayerInput::default(),
            last_kick_ms: None,
        }
    }

    /// Return to the kickoff spot at rest
    pub fn reset(&mut self, kickoff: Vec2) {
        self.pos = kickoff;
        self.vel = Vec2::ZERO;
    }

    /// Turn the latest input into a velocity for this tick
    pub fn apply_input(&mut self, config: &PlayerConfig) {
        let mut dir = Vec2::new(self.input.x.clamp(-1.0, 1.0), self.input.y.clamp(-1.0, 1.0));
        if dir.x != 0.0 && dir.y != 0.0 {
            if let Some(unit) = dir.normalized() {
                dir = unit;
            }
        }
        let target = dir * config.base_speed;

        self.vel.x = steer_axis(self.vel.x, dir.x, target.x, config);
        self.vel.y = steer_axis(self.vel.y, dir.y, target.y, config);

        self.vel = PhysicsSystem::clamp_speed(self.vel, config.max_speed);
        if self.input.sprint {
            self.vel = self.vel * config.sprint_multiplier;
        }
    }

    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn can_kick(&self, now_ms: f64, cooldown_ms: f32) -> bool {
        match self.last_kick_ms {
            Some(last) => now_ms - last >= cooldown_ms as f64,
            None => true,
        }
    }
}

fn steer_axis(vel: f32, input: f32, target: f32, config: &PlayerConfig) -> f32 {
    let next = if input != 0.0 {
        vel + (target - vel) * config.acceleration
    } else {
        vel * config.deceleration
    };
    if next.abs() < STOP_EPSILON {
        0.0
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn player() -> (Player, PlayerConfig) {
        let config = GameConfig::default().player;
        let p = Player::new(Uuid::new_v4(), "Alice".into(), Side::Left, Vec2::new(200.0, 300.0), &config);
        (p, config)
    }

    #[test]
    fn accelerates_toward_base_speed() {
        let (mut p, config) = player();
        p.input = PlayerInput { x: 1.0, y: 0.0, sprint: false };
        p.apply_input(&config);
        assert!((p.vel.x - 6.4).abs() < 1e-4);
        for _ in 0..30 {
            p.apply_input(&config);
        }
        assert!((p.vel.x - config.base_speed).abs() < 1e-3);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let (mut p, config) = player();
        p.input = PlayerInput { x: 1.0, y: 1.0, sprint: false };
        for _ in 0..30 {
            p.apply_input(&config);
        }
        assert!((p.speed() - config.base_speed).abs() < 1e-3);
    }

    #[test]
    fn idle_axis_decays_to_exact_zero() {
        let (mut p, config) = player();
        p.vel = Vec2::new(8.0, -8.0);
        for _ in 0..100 {
            p.apply_input(&config);
        }
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn sprint_scales_after_clamp() {
        let (mut p, config) = player();
        p.vel = Vec2::new(50.0, 0.0);
        p.input = PlayerInput { x: 1.0, y: 0.0, sprint: true };
        p.apply_input(&config);
        let expected = config.max_speed * config.sprint_multiplier;
        assert!((p.speed() - expected).abs() < 1e-3);
    }

    #[test]
    fn kick_cooldown() {
        let (mut p, config) = player();
        assert!(p.can_kick(0.0, config.kick_cooldown_ms));
        p.last_kick_ms = Some(1000.0);
        assert!(!p.can_kick(1100.0, config.kick_cooldown_ms));
        assert!(p.can_kick(1150.0, config.kick_cooldown_ms));
    }
}
