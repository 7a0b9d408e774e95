//! Wallet signature verification
//!
//! Verifies secp256k1 personal-sign signatures by address recovery: the
//! signer's address is recovered from the signature over the exact nonce
//! string and compared case-insensitively against the claimed wallet.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors that can occur during signature verification
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("Signature recovery failed")]
    RecoveryFailed,

    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Check that a string is a `0x`-prefixed 20-byte hex wallet address.
pub fn is_wallet_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) => body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Normalize an address for use as a store key.
pub fn normalize_address(address: &str) -> String {
    address.to_ascii_lowercase()
}

/// Recover the signing address from a personal-sign signature.
///
/// # Arguments
/// * `message` - The exact string that was signed
/// * `signature_hex` - 65-byte r||s||v signature, hex-encoded
///
/// # Returns
/// The recovered address as lowercase `0x`-hex.
pub fn recover_address(message: &str, signature_hex: &str) -> Result<String, CryptoError> {
    let raw = hex::decode(signature_hex.trim_start_matches("0x"))
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    if raw.len() != 65 {
        return Err(CryptoError::InvalidSignatureFormat(format!(
            "Expected 65 bytes, got {}",
            raw.len()
        )));
    }

    let mut signature = Signature::from_slice(&raw[..64])
        .map_err(|e| CryptoError::InvalidSignatureFormat(e.to_string()))?;

    // Wallets emit v as 27/28; the raw recovery id is 0/1.
    let v = raw[64];
    let mut recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or_else(|| CryptoError::InvalidSignatureFormat(format!("Bad recovery id: {v}")))?;

    // Recovery requires a low-s signature; flip the parity along with s.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
            .ok_or(CryptoError::RecoveryFailed)?;
    }

    let key = VerifyingKey::recover_from_digest(
        personal_message_digest(message),
        &signature,
        recovery_id,
    )
    .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_key(&key))
}

/// Verify that a signature over the nonce was produced by the claimed
/// wallet. Pure function, no side effects.
pub fn verify_wallet_signature(
    nonce: &str,
    signature_hex: &str,
    claimed_wallet: &str,
) -> Result<(), CryptoError> {
    let recovered = recover_address(nonce, signature_hex)?;
    if recovered.eq_ignore_ascii_case(claimed_wallet) {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

/// Keccak-256 over the personal-sign envelope of a message.
fn personal_message_digest(message: &str) -> Keccak256 {
    Keccak256::new_with_prefix(format!(
        "\x19Ethereum Signed Message:\n{}{}",
        message.len(),
        message
    ))
}

/// Derive the lowercase `0x`-hex address for a verifying key.
pub fn address_from_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag; the address is the tail of the key hash.
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    fn sign_personal(key: &SigningKey, message: &str) -> String {
        let (signature, recovery_id) = key
            .sign_digest_recoverable(personal_message_digest(message))
            .unwrap();
        let mut raw = signature.to_bytes().to_vec();
        raw.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(raw))
    }

    #[test]
    fn test_recover_matches_signer() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_key(key.verifying_key());

        let signature = sign_personal(&key, "hello nonce");
        assert_eq!(recover_address("hello nonce", &signature).unwrap(), address);
    }

    #[test]
    fn test_verify_rejects_other_wallet() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let other = SigningKey::random(&mut rand::thread_rng());
        let signature = sign_personal(&key, "nonce");

        assert!(verify_wallet_signature(
            "nonce",
            &signature,
            &address_from_key(key.verifying_key())
        )
        .is_ok());
        assert!(matches!(
            verify_wallet_signature("nonce", &signature, &address_from_key(other.verifying_key())),
            Err(CryptoError::VerificationFailed)
        ));
    }

    #[test]
    fn test_verify_is_case_insensitive_on_the_claim() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_key(key.verifying_key()).to_uppercase().replace("0X", "0x");
        let signature = sign_personal(&key, "nonce");

        assert!(verify_wallet_signature("nonce", &signature, &address).is_ok());
    }

    #[test]
    fn test_tampered_message_recovers_different_address() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_key(key.verifying_key());
        let signature = sign_personal(&key, "nonce-a");

        assert!(matches!(
            verify_wallet_signature("nonce-b", &signature, &address),
            Err(CryptoError::VerificationFailed)
        ));
    }

    #[test]
    fn test_malformed_signatures() {
        assert!(matches!(
            recover_address("m", "not-hex"),
            Err(CryptoError::InvalidSignatureFormat(_))
        ));
        assert!(matches!(
            recover_address("m", "0xdead"),
            Err(CryptoError::InvalidSignatureFormat(_))
        ));
    }

    #[test]
    fn test_is_wallet_address() {
        assert!(is_wallet_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(is_wallet_address(
            "0x52908400098527886e0f7030069857d2e4169ee7"
        ));
        assert!(!is_wallet_address("52908400098527886e0f7030069857d2e4169ee7"));
        assert!(!is_wallet_address("0x123"));
        assert!(!is_wallet_address("0xzz908400098527886e0f7030069857d2e4169ee7"));
    }
}
