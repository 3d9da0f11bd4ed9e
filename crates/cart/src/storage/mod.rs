//! Key-value storage backends for the saved cart.
//!
//! The cart is mirrored to a device-local string store under a single key.
//! [`KeyValueStore`] is the seam: the store only needs `get`, `set`, and
//! `remove` over string values.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, used in tests and when nothing
//!   should outlive the process
//! - [`FileStore`] - a JSON document on disk, written atomically

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur while reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The persistence queue shut down before the write completed.
    #[error("Persistence queue closed")]
    Closed,
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
