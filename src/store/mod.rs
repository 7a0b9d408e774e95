//! Process-local state stores
//!
//! Each store encapsulates one map behind a `tokio::sync::RwLock`; the raw
//! map is never exposed and every read-modify-write runs under a single
//! write guard. Stores optionally persist their whole document to a JSON
//! file after each mutation (lab-grade: no partial-write protection), and
//! load leniently at startup — a missing or corrupt file starts empty.

mod access_log;
mod nonces;
mod sessions;
mod users;

pub use access_log::AccessLog;
pub use nonces::{NonceError, NonceLedger};
pub use sessions::SessionRegistry;
pub use users::UserStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize store document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load a whole store document, falling back to the default on any error.
fn load_document<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match std::fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt store file, starting empty");
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

/// Overwrite a whole store document.
fn save_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
