//! Face-verification challenge handlers
//!
//! The desktop side starts a challenge and polls its status; the mobile
//! side receives the push and calls approve after local verification.

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApproveChallengeRequest, ApproveChallengeResponse, ChallengeStatusQuery,
    ChallengeStatusResponse, StartChallengeRequest, StartChallengeResponse,
};
use crate::state::AppState;

/// POST /api/mfa/face - Create a challenge and push it to the device
pub async fn start_face_challenge(
    State(state): State<AppState>,
    Json(req): Json<StartChallengeRequest>,
) -> ApiResult<Json<StartChallengeResponse>> {
    req.validate()?;

    let (challenge_id, pushed_to_device) = state
        .challenge_service
        .create(&req.user_id, &req.device_id)
        .await;

    Ok(Json(StartChallengeResponse {
        ok: true,
        challenge_id,
        pushed_to_device,
    }))
}

/// POST /api/mfa/approve - Mark a challenge approved (idempotent)
pub async fn approve_challenge(
    State(state): State<AppState>,
    Json(req): Json<ApproveChallengeRequest>,
) -> ApiResult<Json<ApproveChallengeResponse>> {
    req.validate()?;

    let outcome = state.challenge_service.approve(&req.challenge_id).await?;

    Ok(Json(ApproveChallengeResponse {
        ok: true,
        already: outcome.already.then_some(true),
    }))
}

/// GET /api/mfa/status - Poll a challenge's status
pub async fn challenge_status(
    State(state): State<AppState>,
    Query(query): Query<ChallengeStatusQuery>,
) -> ApiResult<Json<ChallengeStatusResponse>> {
    let challenge_id = query
        .challenge_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("challengeId required".to_string()))?;

    let status = state.challenge_service.status(&challenge_id).await?;

    Ok(Json(ChallengeStatusResponse { ok: true, status }))
}
