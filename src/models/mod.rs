//! Data models for Authgate

mod auth;
mod challenge;

pub use auth::{
    AccessLogEntry, ClearLogsResponse, CurrentUser, LoginRequest, LoginResponse, MeResponse,
    NonceRecord, NonceRequest, NonceResponse, PasswordLoginRequest, Principal, RefreshRequest,
    RefreshResponse, SessionRecord, TokenPairResponse,
};
pub use challenge::{
    ApproveChallengeRequest, ApproveChallengeResponse, Challenge, ChallengeStatus,
    ChallengeStatusQuery, ChallengeStatusResponse, StartChallengeRequest, StartChallengeResponse,
};

use serde::{Deserialize, Serialize};

/// How a principal authenticated.
///
/// Token issuance and user lookup both dispatch on this, so every match
/// over it is exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Wallet,
    Password,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Wallet => "wallet",
            AuthMethod::Password => "password",
        }
    }
}
