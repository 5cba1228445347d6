//! Key-Value Store Port - Interface for persisting assistant records.
//!
//! Records are stored as JSON documents under string keys. Each record is
//! written independently; there are no cross-key transactions.

use async_trait::async_trait;
use serde_json::Value;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to serialize record {key}: {reason}")]
    SerializationFailed { key: String, reason: String },

    #[error("Failed to deserialize record {key}: {reason}")]
    DeserializationFailed { key: String, reason: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for loading and saving JSON records by key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the record stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the record stored under `key`.
    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove the record under `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Keys currently stored that start with `prefix`, sorted.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Rejects keys that cannot be mapped safely onto a file path.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
