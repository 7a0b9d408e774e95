//! Append-only access log sink

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::AccessLogEntry;

use super::{load_document, save_document, StoreError};

#[derive(Clone)]
pub struct AccessLog {
    path: Option<PathBuf>,
    inner: Arc<RwLock<Vec<AccessLogEntry>>>,
}

impl AccessLog {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn open(path: PathBuf) -> Self {
        let entries = load_document(&path);
        Self {
            path: Some(path),
            inner: Arc::new(RwLock::new(entries)),
        }
    }

    pub async fn append(&self, entry: AccessLogEntry) -> Result<(), StoreError> {
        let mut entries = self.inner.write().await;
        entries.push(entry);
        self.persist(&entries)
    }

    /// The most recent `limit` entries, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<AccessLogEntry> {
        let entries = self.inner.read().await;
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.inner.write().await;
        entries.clear();
        self.persist(&entries)
    }

    fn persist(&self, entries: &[AccessLogEntry]) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => save_document(path, entries),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthMethod;
    use chrono::Utc;

    fn entry(wallet: &str) -> AccessLogEntry {
        AccessLogEntry {
            time: Utc::now(),
            ip: Some("127.0.0.1".to_string()),
            user_agent: None,
            wallet: wallet.to_string(),
            auth_method: AuthMethod::Wallet,
            action: "login".to_string(),
            password_length: None,
        }
    }

    #[tokio::test]
    async fn test_recent_keeps_only_the_tail() {
        let log = AccessLog::in_memory();
        for i in 0..5 {
            log.append(entry(&format!("0x{i}"))).await.unwrap();
        }

        let recent = log.recent(3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].wallet, "0x2");
        assert_eq!(recent[2].wallet, "0x4");
    }

    #[tokio::test]
    async fn test_clear() {
        let log = AccessLog::in_memory();
        log.append(entry("0xabc")).await.unwrap();
        log.clear().await.unwrap();
        assert!(log.recent(50).await.is_empty());
    }
}
