//! Principal store
//!
//! Wallet principals are created on first successful login and updated on
//! every one after that. Records are never deleted.

use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Principal;

use super::{load_document, save_document, StoreError};

#[derive(Clone)]
pub struct UserStore {
    path: Option<PathBuf>,
    inner: Arc<RwLock<HashMap<String, Principal>>>,
}

impl UserStore {
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

    /// Create the principal if unknown, then bump its login counters.
    pub async fn record_login(&self, wallet: &str) -> Result<Principal, StoreError> {
        let mut users = self.inner.write().await;

        let user = users
            .entry(wallet.to_string())
            .or_insert_with(|| Principal::new(wallet));
        user.login_count += 1;
        user.last_login_at = Some(Utc::now());
        let user = user.clone();

        self.persist(&users)?;
        Ok(user)
    }

    pub async fn get(&self, wallet: &str) -> Option<Principal> {
        self.inner.read().await.get(wallet).cloned()
    }

    fn persist(&self, records: &HashMap<String, Principal>) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_document(path, records),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_login_creates_principal() {
        let store = UserStore::in_memory();
        let user = store.record_login("0xabc").await.unwrap();
        assert_eq!(user.wallet, "0xabc");
        assert_eq!(user.login_count, 1);
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_repeat_logins_bump_counter() {
        let store = UserStore::in_memory();
        store.record_login("0xabc").await.unwrap();
        let user = store.record_login("0xabc").await.unwrap();
        assert_eq!(user.login_count, 2);
        assert_eq!(store.get("0xabc").await.unwrap().login_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_principal_is_absent() {
        let store = UserStore::in_memory();
        assert!(store.get("0xmissing").await.is_none());
    }
}
