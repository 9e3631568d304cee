pub mod auth;
pub mod cases;
pub mod extractors;
pub mod messages;
pub mod notifications;
pub mod users;
pub mod ws;

use axum::{middleware as axum_middleware, routing::get, Json, Router};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(get_version))
        .nest("/api", api_routes(state.clone()))
        .merge(ws::ws_routes(state))
}

/// API routes under /api/*. Each module decides which of its routes need a session.
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::auth_routes(state.clone()))
        .nest("/users", users::users_routes(state.clone()))
        .nest("/cases", cases::cases_routes(state.clone()))
        .nest("/messages", messages::messages_routes(state.clone()))
        .nest("/notifications", notifications::notifications_routes(state))
}

/// Layer that rejects requests without a valid, unrevoked access token
pub(crate) fn session_layer(
    router: Router<AppState>,
    state: &AppState,
) -> Router<AppState> {
    router.route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "backend": "rust"
    }))
}
