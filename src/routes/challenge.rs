//! Face-verification challenge routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::challenge;
use crate::state::AppState;

pub fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mfa/face", post(challenge::start_face_challenge))
        .route("/api/mfa/approve", post(challenge::approve_challenge))
        .route("/api/mfa/status", get(challenge::challenge_status))
}
