//! Configuration module - environment variable parsing

mod game;

pub use game::{BallConfig, FieldConfig, GameConfig, PlayerConfig};

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Human readable or JSON log lines
    pub log_format: LogFormat,
    /// Allowed client origins for CORS ("*" allows any)
    pub client_origin: String,
    /// Per-connection outbound queue depth
    pub outbound_buffer: usize,
    /// Optional seed for reproducible rooms
    pub rng_seed: Option<u64>,
    /// Simulation constants shared with the presentation layer
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(_) => return Err(ConfigError::Invalid("LOG_FORMAT")),
        };

        let mut game = GameConfig::default();
        if let Some(secs) = parse_var::<u32>("MATCH_DURATION_SECS")? {
            game.match_rules.duration_secs = secs;
        }
        if let Some(rate) = parse_var::<u32>("TICK_RATE")? {
            game.match_rules.tick_rate = rate;
        }
        game.validate()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            client_origin: env::var("CLIENT_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            outbound_buffer: parse_var("OUTBOUND_BUFFER")?.unwrap_or(256),
            rng_seed: parse_var("RNG_SEED")?,
            game,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            client_origin: "*".to_string(),
            outbound_buffer: 256,
            rng_seed: None,
            game: GameConfig::default(),
        }
    }
}

/// Read an optional variable, failing on values that don't parse
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Inconsistent game configuration: {0}")]
    Game(&'static str),
}
