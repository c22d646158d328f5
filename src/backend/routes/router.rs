/**
 * Router Configuration
 *
 * Combines the health check, the authenticated API and static file serving
 * into one router.
 */
use axum::{middleware, routing::get, Json, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Liveness check (GET /health)
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Create the Axum router with all routes configured
///
/// `route_layer` applies the auth middleware to matched `/api` routes only,
/// so an unknown path is a 404 rather than a 401.
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = configure_api_routes(Router::new()).route_layer(middleware::from_fn_with_state(
        app_state.clone(),
        auth_middleware,
    ));

    let static_dir = app_state.config.static_dir.clone();
    let index = format!("{}/index.html", static_dir.trim_end_matches('/'));
    let static_files = ServeDir::new(&static_dir).not_found_service(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback_service(static_files)
        .with_state(app_state)
}
