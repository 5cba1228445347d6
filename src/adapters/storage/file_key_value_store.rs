//! File-based Key-Value Store Adapter
//!
//! Stores each record as a YAML file on disk. A key such as
//! `carebow/memory/mum` maps to `<base>/carebow/memory/mum.yaml`, so the
//! data directory can be read and edited by hand while debugging.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{validate_key, KeyValueStore, StorageError};

const EXTENSION: &str = "yaml";

/// File-based storage for assistant records
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.{EXTENSION}"))
    }

    async fn ensure_parent(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }
        Ok(())
    }

    /// Key for a file under the base path, if it is a record file.
    fn key_for(&self, path: &Path) -> Option<String> {
        if path.extension()? != EXTENSION {
            return None;
        }
        let relative = path.strip_prefix(&self.base_path).ok()?.with_extension("");
        let segments: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
        Some(segments?.join("/"))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        validate_key(key)?;
        let file_path = self.file_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let yaml = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        let value = serde_yaml::from_str(&yaml).map_err(|e| StorageError::DeserializationFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        validate_key(key)?;
        let file_path = self.file_path(key);
        self.ensure_parent(&file_path).await?;

        let yaml = serde_yaml::to_string(value).map_err(|e| StorageError::SerializationFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        // Write to a sibling temp file, then rename over the record
        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, yaml)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let file_path = self.file_path(key);

        if file_path.exists() {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        if !self.base_path.exists() {
            return Ok(keys);
        }

        let mut pending = vec![self.base_path.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::IoError(e.to_string()))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::IoError(e.to_string()))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        let record = json!({"isSubscribed": false, "freeQuestionsUsed": 2});
        store.put("carebow/assistant", &record).await.unwrap();

        let loaded = store.get("carebow/assistant").await.unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert_eq!(store.get("carebow/feedback").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_layout_follows_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store
            .put("carebow/memory/mum", &json!({"memberId": "mum"}))
            .await
            .unwrap();

        let path = temp_dir.path().join("carebow").join("memory").join("mum.yaml");
        assert!(path.exists());
        let yaml = std::fs::read_to_string(path).unwrap();
        assert!(yaml.contains("memberId: mum"));
    }

    #[tokio::test]
    async fn test_file_store_overwrite_replaces_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.put("carebow/feedback", &json!({"entries": []})).await.unwrap();
        store
            .put("carebow/feedback", &json!({"entries": [1, 2]}))
            .await
            .unwrap();

        let loaded = store.get("carebow/feedback").await.unwrap().unwrap();
        assert_eq!(loaded["entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.put("carebow/memory/dad", &json!({})).await.unwrap();
        store.delete("carebow/memory/dad").await.unwrap();
        assert_eq!(store.get("carebow/memory/dad").await.unwrap(), None);

        // Deleting again is fine
        store.delete("carebow/memory/dad").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_lists_keys_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        for key in ["carebow/assistant", "carebow/memory/mum", "carebow/memory/dad"] {
            store.put(key, &json!({})).await.unwrap();
        }

        let keys = store.keys_with_prefix("carebow/memory/").await.unwrap();
        assert_eq!(keys, vec!["carebow/memory/dad", "carebow/memory/mum"]);
    }

    #[tokio::test]
    async fn test_file_store_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        let result = store.put("../outside", &json!({})).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_record_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        std::fs::create_dir_all(temp_dir.path().join("carebow")).unwrap();
        std::fs::write(temp_dir.path().join("carebow/assistant.yaml"), "key: [unclosed").unwrap();

        let result = store.get("carebow/assistant").await;
        assert!(matches!(result, Err(StorageError::DeserializationFailed { .. })));
    }
}
