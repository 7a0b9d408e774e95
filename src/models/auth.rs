//! Authentication models and request/response DTOs
//!
//! All wire DTOs serialize with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AuthMethod;

/// A registered principal, keyed by its normalized wallet address.
///
/// Wallet principals are created on first successful signature login and
/// mutated on every subsequent one. Password principals use a
/// `user:<name>` pseudo-address and are never persisted here.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub wallet: String,
    pub created_at: DateTime<Utc>,
    pub login_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn new(wallet: &str) -> Self {
        Self {
            wallet: wallet.to_string(),
            created_at: Utc::now(),
            login_count: 0,
            last_login_at: None,
        }
    }
}

/// One live challenge nonce per principal.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NonceRecord {
    pub value: String,
    pub origin: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The single active refresh token for a principal, stored hashed.
///
/// The registry entry, not the token signature, is the revocation
/// authority: overwriting it invalidates every previously issued refresh
/// token for the principal.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub refresh_token_hash: String,
    pub last_issued_at: DateTime<Utc>,
}

/// Append-only access log entry.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogEntry {
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub wallet: String,
    pub auth_method: AuthMethod,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_length: Option<usize>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request for a signing nonce
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet: String,
    pub origin: Option<String>,
}

/// Issued nonce
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub nonce: String,
}

/// Wallet signature login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "wallet required"))]
    pub wallet: String,
    #[validate(length(min = 1, message = "signature required"))]
    pub signature: String,
    #[validate(length(min = 1, message = "nonce required"))]
    pub nonce: String,
    pub origin: Option<String>,
}

/// Tokens plus the principal record, returned on wallet login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Principal,
}

/// Password login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordLoginRequest {
    #[validate(length(min = 1, message = "username required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password required"))]
    pub password: String,
}

/// Token pair without a principal record (password login)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh token required"))]
    pub refresh_token: String,
}

/// Fresh access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// The authenticated identity behind a bearer token.
///
/// Wallet logins resolve to the stored principal record; the password lab
/// account is synthesized from the token claims and never persisted.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CurrentUser {
    Wallet(Principal),
    #[serde(rename_all = "camelCase")]
    Local { wallet: String, lab_user: bool },
}

/// Response for the current-principal endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: CurrentUser,
    pub method: AuthMethod,
}

/// Response after clearing the access log
#[derive(Debug, Serialize)]
pub struct ClearLogsResponse {
    pub ok: bool,
}
