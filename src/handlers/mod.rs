//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod challenge;
pub mod user;

pub use crate::middleware::AuthenticatedUser;

use axum::http::{header, HeaderMap};

use crate::auth::ClientInfo;

/// Pull the client's network identity out of the request headers.
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| ua.chars().take(100).collect());

    ClientInfo { ip, user_agent }
}
