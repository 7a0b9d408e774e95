//! Route definitions

mod admin;
mod auth;
mod challenge;
mod user;

pub use admin::admin_routes;
pub use auth::auth_routes;
pub use challenge::challenge_routes;
pub use user::user_routes;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::websocket;

/// Assemble the full application router (without outer layers, which the
/// binary applies).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ws", get(websocket::ws_handler))
        .merge(auth_routes())
        .merge(user_routes())
        .merge(challenge_routes())
        .merge(admin_routes())
        .with_state(state)
}

async fn root() -> &'static str {
    "Authgate API Server"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
