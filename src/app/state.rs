//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::RoomRegistry;
use crate::matchmaking::MatchmakingService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub matchmaking: Arc<MatchmakingService>,
    pub room_registry: Arc<RoomRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let room_registry = Arc::new(RoomRegistry::new());

        let matchmaking = Arc::new(MatchmakingService::new(
            Arc::new(config.game.clone()),
            room_registry.clone(),
            config.rng_seed,
        ));

        Self {
            config,
            matchmaking,
            room_registry,
        }
    }
}
