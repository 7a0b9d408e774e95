//! Admin routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::admin;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/access-logs", get(admin::access_logs))
        .route("/api/admin/access-logs/clear", post(admin::clear_access_logs))
}
