//! In-Memory Key-Value Store Adapter
//!
//! Keeps records in memory. Useful for testing and development.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{validate_key, KeyValueStore, StorageError};

/// In-memory storage for assistant records
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    records: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Get the number of stored records
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        validate_key(key)?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        validate_key(key)?;
        self.records
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_put_get_delete() {
        let store = InMemoryKeyValueStore::new();

        store.put("carebow/assistant", &json!({"a": 1})).await.unwrap();
        assert_eq!(
            store.get("carebow/assistant").await.unwrap(),
            Some(json!({"a": 1}))
        );
        assert_eq!(store.record_count().await, 1);

        store.delete("carebow/assistant").await.unwrap();
        assert_eq!(store.get("carebow/assistant").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_in_memory_clones_share_records() {
        let store = InMemoryKeyValueStore::new();
        let clone = store.clone();

        store.put("carebow/feedback", &json!([])).await.unwrap();
        assert!(clone.get("carebow/feedback").await.unwrap().is_some());

        clone.clear().await;
        assert_eq!(store.record_count().await, 0);
    }

    #[tokio::test]
    async fn test_in_memory_prefix_listing_is_sorted() {
        let store = InMemoryKeyValueStore::new();
        for key in ["carebow/memory/zed", "carebow/memory/amy", "carebow/feedback"] {
            store.put(key, &json!(null)).await.unwrap();
        }
        assert_eq!(
            store.keys_with_prefix("carebow/memory/").await.unwrap(),
            vec!["carebow/memory/amy", "carebow/memory/zed"]
        );
    }
}
