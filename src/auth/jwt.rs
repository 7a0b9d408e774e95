//! JWT token issuance and verification
//!
//! Access and refresh tokens carry `{sub, kind, method, iat, exp}` and
//! are HS256-signed with the process-wide secret. Verification reports a
//! single failure kind for tampered, malformed, and expired tokens so the
//! caller cannot tell which check failed.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AuthMethod;

/// Token errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Invalid or expired token")]
    InvalidOrExpired,
}

/// Token kind, baked into the claims at signing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed claims bundle
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Principal identifier (normalized wallet or `user:<name>`)
    pub sub: String,
    /// Token kind (access or refresh)
    pub kind: TokenKind,
    /// How the principal authenticated
    pub method: AuthMethod,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issue a short-lived access token.
pub fn issue_access_token(
    principal: &str,
    method: AuthMethod,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    issue_token(principal, TokenKind::Access, method, secret, ttl_seconds)
}

/// Issue a long-lived refresh token.
pub fn issue_refresh_token(
    principal: &str,
    method: AuthMethod,
    secret: &str,
    ttl_days: i64,
) -> Result<String, JwtError> {
    issue_token(
        principal,
        TokenKind::Refresh,
        method,
        secret,
        ttl_days * 24 * 60 * 60,
    )
}

fn issue_token(
    principal: &str,
    kind: TokenKind,
    method: AuthMethod,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let claims = Claims {
        sub: principal.to_string(),
        kind,
        method,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Verify signature and expiry; any failure collapses to one error kind.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| JwtError::InvalidOrExpired)
}
