//! User HTTP handlers

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::models::MeResponse;
use crate::state::AppState;

use super::AuthenticatedUser;

/// GET /api/user/me - Resolve the principal behind the bearer token
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MeResponse>> {
    let response = state
        .auth_service
        .current_user(&user.principal, user.method)
        .await?;

    Ok(Json(response))
}
