//! Per-client rate limiting
//!
//! Fixed one-second windows keyed by client IP. Coarse, but enough to
//! keep a misbehaving poller from monopolizing the relay.

use axum::{
    body::Body,
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Rate limiter state
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, Window>>>,
    max_per_second: u32,
}

impl RateLimiter {
    pub fn new(max_per_second: u32) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            max_per_second,
        }
    }

    /// Count one request for this client and report whether it fits in
    /// the current window.
    pub async fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= Duration::from_secs(1) {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        window.count <= self.max_per_second
    }
}

/// Create rate limiting middleware.
pub fn rate_limit_layer(
    limiter: RateLimiter,
) -> impl Fn(
    Request<Body>,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send {
    move |request: Request<Body>, next: Next| {
        let limiter = limiter.clone();
        Box::pin(async move {
            let client = client_key(&request);

            if !limiter.check(&client).await {
                tracing::warn!(client = %client, "Rate limit exceeded");
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, "1")],
                    "Too many requests",
                )
                    .into_response();
            }

            next.run(request).await
        })
    }
}

fn client_key(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
