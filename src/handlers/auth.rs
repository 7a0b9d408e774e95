//! Authentication HTTP handlers

use axum::{extract::State, http::HeaderMap, Json};
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{
    LoginRequest, LoginResponse, NonceRequest, NonceResponse, PasswordLoginRequest,
    RefreshRequest, RefreshResponse, TokenPairResponse,
};
use crate::state::AppState;

use super::client_info;

/// POST /api/auth/nonce - Issue a signing nonce for a wallet
pub async fn issue_nonce(
    State(state): State<AppState>,
    Json(req): Json<NonceRequest>,
) -> ApiResult<Json<NonceResponse>> {
    let nonce = state
        .auth_service
        .issue_nonce(&req.wallet, req.origin.as_deref())
        .await?;

    Ok(Json(NonceResponse { nonce }))
}

/// POST /api/auth/login - Verify a signed nonce and issue tokens
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let response = state
        .auth_service
        .login_with_signature(
            &req.wallet,
            &req.nonce,
            &req.signature,
            req.origin.as_deref(),
            &client_info(&headers),
        )
        .await?;

    Ok(Json(response))
}

/// POST /api/auth/password-login - Authenticate the lab password account
pub async fn password_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PasswordLoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let tokens = state
        .auth_service
        .login_with_password(&req.username, &req.password, &client_info(&headers))
        .await?;

    Ok(Json(tokens))
}

/// POST /api/auth/refresh - Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    req.validate()?;

    let access_token = state.auth_service.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse { access_token }))
}
