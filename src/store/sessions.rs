//! Session registry
//!
//! Tracks the single active refresh token per principal, stored as a
//! SHA-256 hash. Recording a new token overwrites the prior entry, which
//! is the sole revocation mechanism: an old refresh token stays
//! cryptographically valid but no longer matches the registry.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::SessionRecord;

use super::{load_document, save_document, StoreError};

#[derive(Clone)]
pub struct SessionRegistry {
    path: Option<PathBuf>,
    inner: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl SessionRegistry {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn open(path: PathBuf) -> Self {
        let records = load_document(&path);
        Self {
            path: Some(path),
            inner: Arc::new(RwLock::new(records)),
        }
    }

    /// Record the current refresh token for a principal, overwriting any
    /// prior entry.
    pub async fn record(&self, principal: &str, refresh_token: &str) -> Result<(), StoreError> {
        let mut sessions = self.inner.write().await;
        sessions.insert(
            principal.to_string(),
            SessionRecord {
                refresh_token_hash: hash_token(refresh_token),
                last_issued_at: Utc::now(),
            },
        );
        self.persist(&sessions)
    }

    /// Whether the presented token is exactly the registered one.
    pub async fn matches(&self, principal: &str, refresh_token: &str) -> bool {
        let sessions = self.inner.read().await;
        sessions
            .get(principal)
            .map(|record| record.refresh_token_hash == hash_token(refresh_token))
            .unwrap_or(false)
    }

    pub async fn current(&self, principal: &str) -> Option<SessionRecord> {
        self.inner.read().await.get(principal).cloned()
    }

    fn persist(&self, records: &HashMap<String, SessionRecord>) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_document(path, records),
            None => Ok(()),
        }
    }
}

/// Hash a token for storage.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
