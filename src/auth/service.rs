//! Authentication service
//!
//! Orchestrates the stores and crypto primitives into the login, refresh,
//! and lookup flows. This layer owns the login ordering: the nonce is
//! validated first, burned only after the signature verifies, and tokens
//! are issued before the session registry and access log are updated.

use chrono::Utc;
use thiserror::Error;

use crate::models::{
    AccessLogEntry, AuthMethod, CurrentUser, LoginResponse, MeResponse, Principal,
    TokenPairResponse,
};
use crate::store::{AccessLog, NonceError, NonceLedger, SessionRegistry, StoreError, UserStore};

use super::crypto::{self, CryptoError};
use super::jwt::{self, JwtError, TokenKind};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid wallet address")]
    InvalidWalletAddress,

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error("Invalid signature")]
    Signature(#[from] CryptoError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Invalid or expired refresh token")]
    UnknownRefreshToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Request metadata recorded in the access log
#[derive(Debug, Default, Clone)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// A pre-provisioned local password account.
struct LocalAccount {
    username: String,
    password_hash: String,
}

/// Authentication service
pub struct AuthService {
    users: UserStore,
    nonces: NonceLedger,
    sessions: SessionRegistry,
    access_log: AccessLog,
    local_accounts: Vec<LocalAccount>,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
}

impl AuthService {
    pub fn new(
        users: UserStore,
        nonces: NonceLedger,
        sessions: SessionRegistry,
        access_log: AccessLog,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            users,
            nonces,
            sessions,
            access_log,
            local_accounts: Vec::new(),
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        }
    }

    /// Register a local password account, hashing the password. Call
    /// during startup, before the service is shared.
    pub fn provision_local_account(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        self.local_accounts.push(LocalAccount {
            username: username.to_string(),
            password_hash,
        });
        tracing::info!(username = %username, "Local lab account provisioned");
        Ok(())
    }

    /// Issue a signing nonce for a wallet, replacing any live one.
    pub async fn issue_nonce(&self, wallet: &str, origin: Option<&str>) -> Result<String, AuthError> {
        if !crypto::is_wallet_address(wallet) {
            return Err(AuthError::InvalidWalletAddress);
        }

        let principal = crypto::normalize_address(wallet);
        let nonce = self
            .nonces
            .issue(&principal, origin.unwrap_or_default())
            .await?;

        tracing::info!(wallet = %principal, "Nonce issued");
        Ok(nonce)
    }

    /// Verify a signed nonce and issue a token pair.
    pub async fn login_with_signature(
        &self,
        wallet: &str,
        nonce: &str,
        signature: &str,
        origin: Option<&str>,
        client: &ClientInfo,
    ) -> Result<LoginResponse, AuthError> {
        if !crypto::is_wallet_address(wallet) {
            return Err(AuthError::InvalidWalletAddress);
        }
        let principal = crypto::normalize_address(wallet);

        self.nonces
            .consume(&principal, nonce, origin.unwrap_or_default())
            .await?;

        crypto::verify_wallet_signature(nonce, signature, &principal)?;

        // Signature checked out: the nonce is spent from here on.
        self.nonces.remove(&principal).await?;

        let user = self.users.record_login(&principal).await?;
        let (access_token, refresh_token) =
            self.issue_token_pair(&principal, AuthMethod::Wallet).await?;

        self.access_log
            .append(log_entry(&principal, AuthMethod::Wallet, client, None))
            .await?;

        tracing::info!(wallet = %principal, login_count = user.login_count, "Wallet login succeeded");
        Ok(LoginResponse {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Authenticate the local lab account and issue a token pair.
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<TokenPairResponse, AuthError> {
        let account = self
            .local_accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let principal = format!("user:{}", account.username);
        let (access_token, refresh_token) = self
            .issue_token_pair(&principal, AuthMethod::Password)
            .await?;

        self.access_log
            .append(log_entry(
                &principal,
                AuthMethod::Password,
                client,
                Some(password.len()),
            ))
            .await?;

        tracing::info!(username = %username, "Password login succeeded");
        Ok(TokenPairResponse {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token.
    ///
    /// The presented token must verify, be of refresh kind, and exactly
    /// match the registry's current entry for its principal — a token
    /// superseded by a later login fails here even though its signature
    /// is still valid.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = jwt::verify_token(refresh_token, &self.jwt_secret)?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::UnknownRefreshToken);
        }
        if !self.sessions.matches(&claims.sub, refresh_token).await {
            return Err(AuthError::UnknownRefreshToken);
        }

        let access_token = jwt::issue_access_token(
            &claims.sub,
            claims.method,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;
        Ok(access_token)
    }

    /// Resolve the principal record behind a verified access token.
    pub async fn current_user(
        &self,
        principal: &str,
        method: AuthMethod,
    ) -> Result<MeResponse, AuthError> {
        let user = match method {
            AuthMethod::Wallet => {
                let record = self
                    .users
                    .get(principal)
                    .await
                    .ok_or(AuthError::UserNotFound)?;
                CurrentUser::Wallet(record)
            }
            AuthMethod::Password => CurrentUser::Local {
                wallet: principal.to_string(),
                lab_user: true,
            },
        };

        Ok(MeResponse { user, method })
    }

    /// Look up a wallet principal record directly.
    pub async fn get_principal(&self, wallet: &str) -> Option<Principal> {
        self.users.get(&crypto::normalize_address(wallet)).await
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    async fn issue_token_pair(
        &self,
        principal: &str,
        method: AuthMethod,
    ) -> Result<(String, String), AuthError> {
        let access_token = jwt::issue_access_token(
            principal,
            method,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;
        let refresh_token = jwt::issue_refresh_token(
            principal,
            method,
            &self.jwt_secret,
            self.refresh_token_ttl_days,
        )?;

        self.sessions.record(principal, &refresh_token).await?;
        Ok((access_token, refresh_token))
    }
}

fn log_entry(
    principal: &str,
    method: AuthMethod,
    client: &ClientInfo,
    password_length: Option<usize>,
) -> AccessLogEntry {
    AccessLogEntry {
        time: Utc::now(),
        ip: client.ip.clone(),
        user_agent: client.user_agent.clone(),
        wallet: principal.to_string(),
        auth_method: method,
        action: "login".to_string(),
        password_length,
    }
}
