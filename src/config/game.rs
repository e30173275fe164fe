//! Simulation constants shared between the server and the presentation layer

use serde::Serialize;

use super::ConfigError;

/// Field geometry
#[derive(Debug, Clone, Serialize)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Vertical span of each goal mouth
    pub goal_size: f32,
    pub wall_thickness: f32,
}

/// Player movement and kick constants. Speeds are field units per tick.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerConfig {
    pub radius: f32,
    pub mass: f32,
    pub base_speed: f32,
    pub max_speed: f32,
    /// Fraction of the gap to the target velocity closed each tick
    pub acceleration: f32,
    /// Per-tick velocity multiplier on an idle axis
    pub deceleration: f32,
    pub sprint_multiplier: f32,
    pub kick_power: f32,
    pub kick_cooldown_ms: f32,
    pub wall_restitution: f32,
}

/// Ball constants. Speeds are field units per tick.
#[derive(Debug, Clone, Serialize)]
pub struct BallConfig {
    pub radius: f32,
    pub mass: f32,
    /// Per-tick velocity multiplier
    pub friction: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub wall_restitution: f32,
    /// Restitution used for player contacts
    pub restitution: f32,
    /// Share of the player's velocity added on contact
    pub momentum_transfer: f32,
    /// Half-range of the random tangential nudge after a wall bounce
    pub wall_jitter: f32,
    /// Kick impulses are capped at `max_speed * kick_cap_ratio`
    pub kick_cap_ratio: f32,
}

/// Match timing
#[derive(Debug, Clone, Serialize)]
pub struct MatchConfig {
    pub duration_secs: u32,
    pub tick_rate: u32,
}

/// Full shared configuration contract
#[derive(Debug, Clone, Serialize)]
pub struct GameConfig {
    pub field: FieldConfig,
    pub player: PlayerConfig,
    pub ball: BallConfig,
    #[serde(rename = "match")]
    pub match_rules: MatchConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig {
                width: 800.0,
                height: 600.0,
                goal_size: 140.0,
                wall_thickness: 10.0,
            },
            player: PlayerConfig {
                radius: 20.0,
                mass: 5.0,
                base_speed: 8.0,
                max_speed: 12.0,
                acceleration: 0.8,
                deceleration: 0.85,
                sprint_multiplier: 1.3,
                kick_power: 15.0,
                kick_cooldown_ms: 150.0,
                wall_restitution: 0.5,
            },
            ball: BallConfig {
                radius: 10.0,
                mass: 1.0,
                friction: 0.995,
                min_speed: 0.5,
                max_speed: 20.0,
                wall_restitution: 0.95,
                restitution: 0.9,
                momentum_transfer: 0.2,
                wall_jitter: 1.0,
                kick_cap_ratio: 1.2,
            },
            match_rules: MatchConfig {
                duration_secs: 120,
                tick_rate: 60,
            },
        }
    }
}

impl GameConfig {
    /// Reject combinations the simulation can't run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        if f.width <= 0.0 || f.height <= 0.0 || f.wall_thickness < 0.0 {
            return Err(ConfigError::Game("field dimensions must be positive"));
        }
        if f.goal_size <= 0.0 || f.goal_size >= f.height - 2.0 * f.wall_thickness {
            return Err(ConfigError::Game("goal mouth must fit inside the side wall"));
        }
        if self.player.radius <= 0.0 || self.ball.radius <= 0.0 {
            return Err(ConfigError::Game("radii must be positive"));
        }
        if self.player.mass <= 0.0 || self.ball.mass <= 0.0 {
            return Err(ConfigError::Game("masses must be positive"));
        }
        if self.ball.min_speed >= self.ball.max_speed {
            return Err(ConfigError::Game("ball min speed must be below max speed"));
        }
        if self.match_rules.tick_rate == 0 || self.match_rules.duration_secs == 0 {
            return Err(ConfigError::Game("tick rate and duration must be non-zero"));
        }
        Ok(())
    }
}
