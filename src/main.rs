//! Authgate Server
//!
//! Authentication relay binary: wires the stores, services, and router
//! together and serves HTTP + WebSocket on one listener.

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use authgate_server::auth::AuthService;
use authgate_server::challenge::ChallengeService;
use authgate_server::config::Config;
use authgate_server::middleware::{rate_limit_layer, request_tracing, security_headers, RateLimiter};
use authgate_server::routes;
use authgate_server::state::AppState;
use authgate_server::store::{AccessLog, NonceLedger, SessionRegistry, UserStore};
use authgate_server::websocket::DeviceRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    std::fs::create_dir_all(&config.data_dir).context("Failed to create data directory")?;

    let users = UserStore::open(config.data_dir.join("users.json"));
    let nonces = NonceLedger::open(config.data_dir.join("nonces.json"), config.nonce_ttl_seconds);
    let sessions = SessionRegistry::open(config.data_dir.join("sessions.json"));
    let access_log = AccessLog::open(config.data_dir.join("access_logs.json"));

    let mut auth_service = AuthService::new(
        users,
        nonces,
        sessions,
        access_log,
        config.jwt_secret.clone(),
        config.access_token_ttl_seconds,
        config.refresh_token_ttl_days,
    );
    auth_service
        .provision_local_account(&config.demo_username, &config.demo_password)
        .context("Failed to provision the lab account")?;

    let device_registry = DeviceRegistry::new();
    let challenge_service = Arc::new(ChallengeService::new(device_registry.clone()));
    let state = AppState::new(Arc::new(auth_service), challenge_service, device_registry);

    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    let app = routes::router(state)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(axum::middleware::from_fn(request_tracing))
        .layer(axum::middleware::from_fn(rate_limit_layer(rate_limiter)))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Device pairing channel at ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn configure_cors(config: &Config) -> CorsLayer {
    let Some(origins_str) = config.cors_allowed_origins.as_deref() else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
