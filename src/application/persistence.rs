//! Record-level persistence for the assistant.
//!
//! Three independent record sets live behind the key-value port: the
//! assistant state, one health memory per member, and the feedback ledger.
//! Saves made during a conversation are best-effort: a failure is logged and
//! the in-memory state stays authoritative.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::state::AssistantState;
use crate::domain::feedback::FeedbackLedger;
use crate::domain::foundation::{MemberId, Timestamp};
use crate::domain::memory::MemberHealthMemory;
use crate::ports::{KeyValueStore, StorageError};

pub const ASSISTANT_KEY: &str = "carebow/assistant";
pub const FEEDBACK_KEY: &str = "carebow/feedback";
pub const MEMORY_PREFIX: &str = "carebow/memory/";

/// Storage key for a member's memory.
///
/// Member ids are free text. Every byte outside `[A-Za-z0-9_-]` is written as
/// `.XX` (uppercase hex), so the id always maps to one valid key segment and
/// distinct ids never share a key.
pub fn memory_key(member_id: &MemberId) -> String {
    let mut key = String::from(MEMORY_PREFIX);
    for byte in member_id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            key.push(char::from(byte));
        } else {
            key.push_str(&format!(".{byte:02X}"));
        }
    }
    key
}

#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(value) = self.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::DeserializationFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save<T: Serialize>(&self, key: &str, record: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(record).map_err(|e| StorageError::SerializationFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.store.put(key, &value).await?;
        debug!(key, "record saved");
        Ok(())
    }

    /// Loads a record, falling back to `fallback` when it is missing or
    /// unreadable.
    async fn load_or<T: DeserializeOwned>(&self, key: &str, fallback: impl FnOnce() -> T) -> T {
        match self.load(key).await {
            Ok(Some(record)) => record,
            Ok(None) => fallback(),
            Err(error) => {
                warn!(key, %error, "could not load record, starting fresh");
                fallback()
            }
        }
    }

    async fn save_best_effort<T: Serialize>(&self, key: &str, record: &T) {
        if let Err(error) = self.save(key, record).await {
            warn!(key, %error, "could not save record, continuing with in-memory state");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record sets
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn load_assistant(&self) -> AssistantState {
        self.load_or(ASSISTANT_KEY, AssistantState::default).await
    }

    pub async fn load_feedback(&self) -> FeedbackLedger {
        self.load_or(FEEDBACK_KEY, FeedbackLedger::new).await
    }

    pub async fn load_memory(&self, member_id: &MemberId, now: Timestamp) -> MemberHealthMemory {
        self.load_or(&memory_key(member_id), || {
            MemberHealthMemory::new(member_id.clone(), now)
        })
        .await
    }

    pub async fn save_assistant(&self, state: &AssistantState) {
        self.save_best_effort(ASSISTANT_KEY, state).await;
    }

    pub async fn save_feedback(&self, ledger: &FeedbackLedger) {
        self.save_best_effort(FEEDBACK_KEY, ledger).await;
    }

    pub async fn save_memory(&self, memory: &MemberHealthMemory) {
        self.save_best_effort(&memory_key(memory.member_id()), memory)
            .await;
    }

    pub async fn delete_memory(&self, member_id: &MemberId) -> Result<(), StorageError> {
        self.store.delete(&memory_key(member_id)).await
    }

    /// Writes every record set, reporting the first failure.
    pub async fn flush(
        &self,
        state: &AssistantState,
        ledger: &FeedbackLedger,
        memories: impl IntoIterator<Item = &MemberHealthMemory>,
    ) -> Result<(), StorageError> {
        self.save(ASSISTANT_KEY, state).await?;
        self.save(FEEDBACK_KEY, ledger).await?;
        for memory in memories {
            self.save(&memory_key(memory.member_id()), memory).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKeyValueStore;
    use crate::ports::validate_key;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Store whose writes always fail.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StorageError> {
            Err(StorageError::IoError("disk on fire".to_string()))
        }

        async fn put(&self, _key: &str, _value: &Value) -> Result<(), StorageError> {
            Err(StorageError::IoError("disk on fire".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::IoError("disk on fire".to_string()))
        }

        async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn memory_keys_are_namespaced_by_member() {
        let mum = MemberId::new("mum").unwrap();
        assert_eq!(memory_key(&mum), "carebow/memory/mum");
    }

    #[test]
    fn free_text_member_ids_map_to_valid_keys() {
        let cases = [
            ("Grandma Rose", "carebow/memory/Grandma.20Rose"),
            ("mom@family.com", "carebow/memory/mom.40family.2Ecom"),
            ("../etc", "carebow/memory/.2E.2E.2Fetc"),
            ("José", "carebow/memory/Jos.C3.A9"),
        ];
        for (id, expected) in cases {
            let key = memory_key(&MemberId::new(id).unwrap());
            assert_eq!(key, expected);
            assert!(validate_key(&key).is_ok(), "{key}");
        }
    }

    #[test]
    fn escaped_ids_do_not_collide() {
        let plain = MemberId::new("a.20b").unwrap();
        let spaced = MemberId::new("a b").unwrap();
        assert_ne!(memory_key(&plain), memory_key(&spaced));
    }

    #[tokio::test]
    async fn missing_records_load_as_defaults() {
        let persistence = Persistence::new(Arc::new(InMemoryKeyValueStore::new()));
        assert_eq!(persistence.load_assistant().await, AssistantState::default());
        assert!(persistence.load_feedback().await.entries().is_empty());
    }

    #[tokio::test]
    async fn unreadable_record_falls_back_to_default() {
        let store = InMemoryKeyValueStore::new();
        store.put(FEEDBACK_KEY, &json!("not a ledger")).await.unwrap();
        let persistence = Persistence::new(Arc::new(store));
        assert!(persistence.load_feedback().await.entries().is_empty());
    }

    #[tokio::test]
    async fn memory_round_trips_through_store() {
        let persistence = Persistence::new(Arc::new(InMemoryKeyValueStore::new()));
        let dad = MemberId::new("dad").unwrap();
        let mut memory = MemberHealthMemory::new(dad.clone(), Timestamp::now());
        memory.record_fact(
            crate::domain::memory::FactKind::Medication,
            "aspirin",
            crate::domain::memory::FactSource::UserReported,
            None,
            Timestamp::now(),
        );
        persistence.save_memory(&memory).await;

        assert_eq!(persistence.load_memory(&dad, Timestamp::now()).await, memory);
    }

    #[tokio::test]
    async fn best_effort_saves_swallow_failures() {
        let persistence = Persistence::new(Arc::new(BrokenStore));
        persistence.save_assistant(&AssistantState::default()).await;
        assert_eq!(persistence.load_assistant().await, AssistantState::default());
    }

    #[tokio::test]
    async fn flush_reports_failures() {
        let persistence = Persistence::new(Arc::new(BrokenStore));
        let result = persistence
            .flush(&AssistantState::default(), &FeedbackLedger::new(), [])
            .await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }
}
