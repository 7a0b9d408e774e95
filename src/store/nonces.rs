//! Nonce ledger
//!
//! Issues one-time signing challenges, at most one live nonce per
//! principal. Issuing again overwrites (and thereby invalidates) the
//! prior record. Consumption validates value, expiry, and origin binding;
//! deletion on success is the caller's duty after the signature verifies,
//! so an invalid signature does not burn the nonce.

use chrono::{Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::NonceRecord;

use super::{load_document, save_document, StoreError};

/// Nonce consumption failures
#[derive(Error, Debug)]
pub enum NonceError {
    #[error("Invalid nonce")]
    NotFound,

    #[error("Invalid nonce")]
    Mismatch,

    #[error("Expired nonce")]
    Expired,

    #[error("Origin mismatch")]
    OriginMismatch,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Clone)]
pub struct NonceLedger {
    path: Option<PathBuf>,
    ttl_seconds: i64,
    inner: Arc<RwLock<HashMap<String, NonceRecord>>>,
}

impl NonceLedger {
    pub fn in_memory(ttl_seconds: i64) -> Self {
        Self {
            path: None,
            ttl_seconds,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn open(path: PathBuf, ttl_seconds: i64) -> Self {
        let records = load_document(&path);
        Self {
            path: Some(path),
            ttl_seconds,
            inner: Arc::new(RwLock::new(records)),
        }
    }

    /// Issue a fresh nonce for a principal, replacing any prior record.
    pub async fn issue(&self, principal: &str, origin: &str) -> Result<String, StoreError> {
        let value = generate_nonce_value();
        let now = Utc::now();
        let record = NonceRecord {
            value: value.clone(),
            origin: origin.to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(self.ttl_seconds),
        };

        let mut nonces = self.inner.write().await;
        nonces.insert(principal.to_string(), record);
        self.persist(&nonces)?;

        Ok(value)
    }

    /// Validate a presented nonce against the live record.
    ///
    /// An expired record is deleted as a side effect. Success leaves the
    /// record in place; the caller removes it once the signature checks
    /// out (mandatory single-use).
    pub async fn consume(
        &self,
        principal: &str,
        presented: &str,
        presented_origin: &str,
    ) -> Result<(), NonceError> {
        let mut nonces = self.inner.write().await;

        let record = nonces.get(principal).ok_or(NonceError::NotFound)?;

        if record.value != presented {
            return Err(NonceError::Mismatch);
        }

        if record.expires_at < Utc::now() {
            nonces.remove(principal);
            self.persist(&nonces).map_err(NonceError::Storage)?;
            return Err(NonceError::Expired);
        }

        // Origin binding only applies when both sides declared one.
        if !record.origin.is_empty()
            && !presented_origin.is_empty()
            && record.origin != presented_origin
        {
            return Err(NonceError::OriginMismatch);
        }

        Ok(())
    }

    /// Delete the live nonce for a principal.
    pub async fn remove(&self, principal: &str) -> Result<(), StoreError> {
        let mut nonces = self.inner.write().await;
        nonces.remove(principal);
        self.persist(&nonces)
    }

    fn persist(&self, records: &HashMap<String, NonceRecord>) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_document(path, records),
            None => Ok(()),
        }
    }
}

/// Generate a cryptographically secure nonce value.
fn generate_nonce_value() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
