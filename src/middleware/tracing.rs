//! Request tracing middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log each request with its client, status, and duration.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    let duration_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!(%method, %path, ?client_ip, status = status.as_u16(), duration_ms, "Request failed");
    } else {
        tracing::info!(%method, %path, ?client_ip, status = status.as_u16(), duration_ms, "Request completed");
    }

    response
}
