/**
 * Application State
 *
 * `AppState` is cloned into every handler. Each field is cheap to clone:
 * the service holds the store behind an `Arc`, and the channel registry and
 * lock registry share their maps.
 *
 * The `FromRef` implementations let handlers and middleware extract just
 * the part they need, e.g. `State<BoardChannels>`.
 */
use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::board::ContainerService;
use crate::backend::realtime::BoardChannels;
use crate::shared::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Ordered mutations and, through `store()`, plain entity access
    pub service: ContainerService,

    /// One broadcast channel per board with live subscribers
    pub channels: BoardChannels,

    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service: ContainerService, config: AppConfig) -> Self {
        Self {
            service,
            channels: BoardChannels::new(config.broadcast_capacity),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for ContainerService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.service.clone()
    }
}

impl FromRef<AppState> for BoardChannels {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.channels.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
