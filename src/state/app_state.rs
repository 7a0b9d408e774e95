//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::challenge::ChallengeService;
use crate::websocket::DeviceRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub challenge_service: Arc<ChallengeService>,
    pub device_registry: DeviceRegistry,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        challenge_service: Arc<ChallengeService>,
        device_registry: DeviceRegistry,
    ) -> Self {
        Self {
            auth_service,
            challenge_service,
            device_registry,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<ChallengeService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.challenge_service.clone()
    }
}

impl FromRef<AppState> for DeviceRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.device_registry.clone()
    }
}
