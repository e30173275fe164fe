//! The ball

use rand::Rng;

use crate::config::BallConfig;

use super::physics::{PhysicsSystem, Vec2};

/// Each reset velocity component is drawn from ±[min, max]
const RESET_SPEED_RANGE: (f32, f32) = (0.5, 2.5);

#[derive(Debug, Clone)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
}

impl Ball {
    pub fn new(config: &BallConfig, center: Vec2) -> Self {
        Self {
            pos: center,
            vel: Vec2::ZERO,
            radius: config.radius,
            mass: config.mass,
            restitution: config.restitution,
        }
    }

    /// Place the ball at `center` with a fresh non-zero velocity
    pub fn reset<R: Rng>(&mut self, center: Vec2, rng: &mut R) {
        self.pos = center;
        self.vel = Vec2::new(signed_in_range(rng), signed_in_range(rng));
    }

    /// Advance by one tick and apply rolling friction
    pub fn integrate(&mut self, friction: f32) {
        self.pos += self.vel;
        self.vel = self.vel * friction;
    }

    /// Keep a moving ball from stalling and cap runaway speed
    pub fn limit_speed(&mut self, config: &BallConfig) {
        self.vel = PhysicsSystem::enforce_min_speed(self.vel, config.min_speed);
        self.vel = PhysicsSystem::clamp_speed(self.vel, config.max_speed);
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

fn signed_in_range<R: Rng>(rng: &mut R) -> f32 {
    let (min, max) = RESET_SPEED_RANGE;
    let magnitude = rng.gen_range(min..=max);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}
