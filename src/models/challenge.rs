//! Face-verification challenge models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Challenge lifecycle: `pending` → `approved`, one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Approved,
}

/// An out-of-band approval challenge linking a desktop login attempt to a
/// mobile verification action. Lives in memory only; no expiry is
/// enforced (known gap, kept for behavioral fidelity).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub status: ChallengeStatus,
    pub user_id: String,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to start a face-verification challenge
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartChallengeRequest {
    #[validate(length(min = 1, message = "userId required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "deviceId required"))]
    pub device_id: String,
}

/// Created challenge, with the outcome of the best-effort device push
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChallengeResponse {
    pub ok: bool,
    pub challenge_id: String,
    pub pushed_to_device: bool,
}

/// Request to approve a challenge
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApproveChallengeRequest {
    #[validate(length(min = 1, message = "challengeId required"))]
    pub challenge_id: String,
}

/// Approval outcome; `already` is present when the challenge had been
/// approved before this call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveChallengeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already: Option<bool>,
}

/// Query string for the status poll
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatusQuery {
    pub challenge_id: Option<String>,
}

/// Current challenge status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatusResponse {
    pub ok: bool,
    pub status: ChallengeStatus,
}
