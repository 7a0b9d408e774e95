//! Authentication flow tests
//!
//! Drive the auth service end to end: nonce issuance, signature login,
//! token refresh, rotation, and the password lab account.

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use authgate_server::auth::crypto::address_from_key;
use authgate_server::auth::{AuthError, AuthService, ClientInfo};
use authgate_server::models::{AuthMethod, CurrentUser};
use authgate_server::store::{AccessLog, NonceError, NonceLedger, SessionRegistry, UserStore};

const SECRET: &str = "test-secret";

fn service_with_nonce_ttl(ttl_seconds: i64) -> AuthService {
    AuthService::new(
        UserStore::in_memory(),
        NonceLedger::in_memory(ttl_seconds),
        SessionRegistry::in_memory(),
        AccessLog::in_memory(),
        SECRET.to_string(),
        900,
        7,
    )
}

fn service() -> AuthService {
    service_with_nonce_ttl(300)
}

/// Sign a nonce the way a wallet does: 65-byte r||s||v over the
/// personal-sign envelope, hex-encoded.
fn sign_nonce(key: &SigningKey, nonce: &str) -> String {
    let digest = Keccak256::new_with_prefix(format!(
        "\x19Ethereum Signed Message:\n{}{}",
        nonce.len(),
        nonce
    ));
    let (signature, recovery_id) = key.sign_digest_recoverable(digest).unwrap();
    let mut raw = signature.to_bytes().to_vec();
    raw.push(recovery_id.to_byte() + 27);
    format!("0x{}", hex::encode(raw))
}

fn keypair() -> (SigningKey, String) {
    let key = SigningKey::random(&mut rand::thread_rng());
    let address = address_from_key(key.verifying_key());
    (key, address)
}

// ============================================================================
// Nonce and signature login
// ============================================================================

#[tokio::test]
async fn test_signature_login_end_to_end() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let signature = sign_nonce(&key, &nonce);

    let response = service
        .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
        .await
        .unwrap();

    assert!(!response.access_token.is_empty());
    assert!(!response.refresh_token.is_empty());
    assert_eq!(response.user.wallet, address.to_lowercase());
    assert_eq!(response.user.login_count, 1);
}

#[tokio::test]
async fn test_nonce_is_single_use() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let signature = sign_nonce(&key, &nonce);

    service
        .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
        .await
        .unwrap();

    // Replaying the consumed nonce finds no record at all.
    let replay = service
        .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
        .await;
    assert!(matches!(replay, Err(AuthError::Nonce(NonceError::NotFound))));
}

#[tokio::test]
async fn test_reissuing_invalidates_the_prior_nonce() {
    let service = service();
    let (key, address) = keypair();

    let first = service.issue_nonce(&address, None).await.unwrap();
    let _second = service.issue_nonce(&address, None).await.unwrap();

    let signature = sign_nonce(&key, &first);
    let result = service
        .login_with_signature(&address, &first, &signature, None, &ClientInfo::default())
        .await;
    assert!(matches!(result, Err(AuthError::Nonce(NonceError::Mismatch))));
}

#[tokio::test]
async fn test_expired_nonce_is_rejected_then_gone() {
    let service = service_with_nonce_ttl(-1);
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let signature = sign_nonce(&key, &nonce);

    let result = service
        .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
        .await;
    assert!(matches!(result, Err(AuthError::Nonce(NonceError::Expired))));

    // Expiry detection deleted the record.
    let result = service
        .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
        .await;
    assert!(matches!(result, Err(AuthError::Nonce(NonceError::NotFound))));
}

#[tokio::test]
async fn test_origin_binding_is_enforced() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service
        .issue_nonce(&address, Some("http://localhost:5173"))
        .await
        .unwrap();
    let signature = sign_nonce(&key, &nonce);

    let result = service
        .login_with_signature(
            &address,
            &nonce,
            &signature,
            Some("http://evil.example"),
            &ClientInfo::default(),
        )
        .await;
    assert!(matches!(
        result,
        Err(AuthError::Nonce(NonceError::OriginMismatch))
    ));
}

#[tokio::test]
async fn test_wrong_signer_does_not_burn_the_nonce() {
    let service = service();
    let (key, address) = keypair();
    let (other_key, _) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();

    let result = service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&other_key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await;
    assert!(matches!(result, Err(AuthError::Signature(_))));

    // The nonce survives a failed signature and still works for the
    // rightful signer.
    service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_wallet_address_is_rejected() {
    let service = service();
    assert!(matches!(
        service.issue_nonce("not-a-wallet", None).await,
        Err(AuthError::InvalidWalletAddress)
    ));
}

#[tokio::test]
async fn test_login_counters_accumulate() {
    let service = service();
    let (key, address) = keypair();

    for _ in 0..3 {
        let nonce = service.issue_nonce(&address, None).await.unwrap();
        let signature = sign_nonce(&key, &nonce);
        service
            .login_with_signature(&address, &nonce, &signature, None, &ClientInfo::default())
            .await
            .unwrap();
    }

    let principal = service.get_principal(&address).await.unwrap();
    assert_eq!(principal.login_count, 3);
    assert!(principal.last_login_at.is_some());
}

// ============================================================================
// Refresh and rotation
// ============================================================================

#[tokio::test]
async fn test_refresh_issues_a_working_access_token() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let tokens = service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();

    let access = service.refresh(&tokens.refresh_token).await.unwrap();
    let claims = authgate_server::auth::verify_token(&access, SECRET).unwrap();
    assert_eq!(claims.sub, address.to_lowercase());
    assert_eq!(claims.method, AuthMethod::Wallet);
}

#[tokio::test]
async fn test_second_login_revokes_the_first_refresh_token() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let first = service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();

    // The first refresh token works while it is current.
    service.refresh(&first.refresh_token).await.unwrap();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let second = service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();

    // Rotation: only the latest registered token refreshes.
    assert!(matches!(
        service.refresh(&first.refresh_token).await,
        Err(AuthError::UnknownRefreshToken)
    ));
    service.refresh(&second.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_refresh_rejects_access_tokens() {
    let service = service();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    let tokens = service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();

    assert!(matches!(
        service.refresh(&tokens.access_token).await,
        Err(AuthError::UnknownRefreshToken)
    ));
}

#[tokio::test]
async fn test_refresh_rejects_garbage() {
    let service = service();
    assert!(matches!(
        service.refresh("junk.token.value").await,
        Err(AuthError::Token(_))
    ));
}

// ============================================================================
// Password lab account
// ============================================================================

#[tokio::test]
async fn test_password_login_and_refresh() {
    let mut service = service();
    service.provision_local_account("user", "pass").unwrap();

    let tokens = service
        .login_with_password("user", "pass", &ClientInfo::default())
        .await
        .unwrap();

    let access = service.refresh(&tokens.refresh_token).await.unwrap();
    let claims = authgate_server::auth::verify_token(&access, SECRET).unwrap();
    assert_eq!(claims.sub, "user:user");
    assert_eq!(claims.method, AuthMethod::Password);
}

#[tokio::test]
async fn test_password_login_rejects_bad_credentials() {
    let mut service = service();
    service.provision_local_account("user", "pass").unwrap();

    assert!(matches!(
        service
            .login_with_password("user", "wrong", &ClientInfo::default())
            .await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        service
            .login_with_password("nobody", "pass", &ClientInfo::default())
            .await,
        Err(AuthError::InvalidCredentials)
    ));
}

// ============================================================================
// Current principal lookup
// ============================================================================

#[tokio::test]
async fn test_current_user_for_both_methods() {
    let mut service = service();
    service.provision_local_account("user", "pass").unwrap();
    let (key, address) = keypair();

    let nonce = service.issue_nonce(&address, None).await.unwrap();
    service
        .login_with_signature(
            &address,
            &nonce,
            &sign_nonce(&key, &nonce),
            None,
            &ClientInfo::default(),
        )
        .await
        .unwrap();

    let me = service
        .current_user(&address.to_lowercase(), AuthMethod::Wallet)
        .await
        .unwrap();
    match me.user {
        CurrentUser::Wallet(principal) => assert_eq!(principal.login_count, 1),
        CurrentUser::Local { .. } => panic!("expected a wallet principal"),
    }

    let me = service
        .current_user("user:user", AuthMethod::Password)
        .await
        .unwrap();
    match me.user {
        CurrentUser::Local { wallet, lab_user } => {
            assert_eq!(wallet, "user:user");
            assert!(lab_user);
        }
        CurrentUser::Wallet(_) => panic!("expected a lab principal"),
    }
}

#[tokio::test]
async fn test_current_user_unknown_wallet_is_not_found() {
    let service = service();
    assert!(matches!(
        service.current_user("0xdeadbeef", AuthMethod::Wallet).await,
        Err(AuthError::UserNotFound)
    ));
}
