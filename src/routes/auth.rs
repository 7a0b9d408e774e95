//! Authentication routes

use axum::{routing::post, Router};

use crate::handlers::auth;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/nonce", post(auth::issue_nonce))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/password-login", post(auth::password_login))
        .route("/api/auth/refresh", post(auth::refresh_token))
}
