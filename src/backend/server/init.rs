/**
 * Server Initialization
 *
 * Builds `AppState` around a store, starts the periodic cleanup task and
 * returns the configured router.
 */
use std::sync::Arc;

use axum::Router;

use crate::backend::board::ContainerService;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::backend::store::BoardStore;
use crate::shared::AppConfig;

/// Create the application, selecting the store from `config`
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!("[Server] Initializing taskboard backend");
    let store = load_store(&config).await;
    create_app_with_store(config, store)
}

/// Create the application around an existing store
///
/// Must be called inside a Tokio runtime; the cleanup task is spawned here.
pub fn create_app_with_store(config: AppConfig, store: Arc<dyn BoardStore>) -> Router<()> {
    let app_state = AppState::new(ContainerService::new(store), config);
    spawn_cleanup(&app_state);
    create_router(app_state)
}

/// Periodically drop board channels without subscribers and idle locks
fn spawn_cleanup(app_state: &AppState) {
    let channels = app_state.channels.clone();
    let locks = app_state.service.locks().clone();
    let period = app_state.config.channel_cleanup_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let channels_removed = channels.cleanup_inactive_channels();
            let locks_removed = locks.prune();
            tracing::debug!(
                "[Server] Cleanup removed {} idle channel(s) and {} idle lock(s)",
                channels_removed,
                locks_removed
            );
        }
    });
    tracing::info!("[Server] Periodic cleanup every {:?}", period);
}
