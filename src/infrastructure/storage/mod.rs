//! Durable key-value storage port
//!
//! The capture core's only write target. Keys are owner/source-scoped
//! strings, values are JSON-serialized sequences or scalar signature
//! strings. Every mutation reads the full collection, modifies it in
//! memory, and writes the full collection back: last writer wins, no
//! locking. Concurrent writers can race and lose updates; that is the
//! accepted concurrency model of this store, inherited from the system
//! it captures for.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

mod json_file;
mod memory;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;

pub mod keys;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key contains characters the backend cannot represent
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (serialization only; parse failures degrade to fallbacks)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Key-value storage port.
///
/// Injected into the capture core so the fingerprinting and
/// materialization logic can run against any persistence backend: the
/// file-backed store in production, an in-memory fake in tests.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` entirely. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Read a JSON value under `key`, falling back to `T::default()` when the
/// key is absent or the stored value does not parse.
///
/// A corrupted value is treated as "collection absent", never as a fatal
/// error; the corruption is surfaced on the diagnostic channel so it is
/// visible without breaking the capture cycle.
pub async fn read_json<T>(storage: &dyn StorageBackend, key: &str) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
{
    match storage.get(key).await? {
        None => Ok(T::default()),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("Discarding corrupt value under {:?}: {}", key, err);
                Ok(T::default())
            }
        },
    }
}

/// Serialize `value` as JSON and store it under `key`.
pub async fn write_json<T>(storage: &dyn StorageBackend, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw).await
}
