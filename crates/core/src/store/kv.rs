//! Key-value storage trait with per-entry TTL.
//!
//! Backs the token cache and the job correlation store. Entries expire
//! lazily: an expired row is treated as absent and removed on the next read.

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored value could not be (de)serialized.
    #[error("Serialization error for key '{key}': {reason}")]
    Serialization { key: String, reason: String },
}

/// Trait for TTL key-value storage backends.
pub trait KvStore: Send + Sync {
    /// Get a value by key. Expired entries read as absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value under a key, replacing any previous entry.
    /// The entry expires `ttl_secs` seconds from now.
    fn put_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Remove an entry. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
