//! Restart behaviour with the file-backed store.

use std::sync::Arc;

use carebow_triage::adapters::{FileKeyValueStore, InMemoryProfileReader, StubBookingGateway};
use carebow_triage::application::CareAssistant;
use carebow_triage::config::AssistantConfig;
use carebow_triage::domain::feedback::FeedbackSubmission;
use carebow_triage::domain::foundation::{MemberId, UserId};
use carebow_triage::domain::memory::FactKind;
use carebow_triage::ports::KeyValueStore;
use tempfile::TempDir;

fn member() -> MemberId {
    MemberId::new("grandma").unwrap()
}

async fn open(dir: &TempDir) -> CareAssistant {
    CareAssistant::load(
        AssistantConfig::default(),
        Arc::new(FileKeyValueStore::new(dir.path())),
        Arc::new(InMemoryProfileReader::new()),
        Arc::new(StubBookingGateway::new()),
    )
    .await
}

#[tokio::test]
async fn sessions_feedback_and_memory_survive_a_restart() {
    let dir = TempDir::new().unwrap();

    let session_id = {
        let mut assistant = open(&dir).await;
        let id = *assistant
            .start_new_session(UserId::new("me").unwrap(), member())
            .await
            .unwrap()
            .session
            .id();
        assistant.send_message(&id, "sore throat since yesterday").await.unwrap();
        let greeting = *assistant.get_session(&id).unwrap().messages()[0].id();
        assistant
            .submit_feedback(FeedbackSubmission::helpful(id, greeting))
            .await
            .unwrap();
        assistant
            .record_reported_fact(&member(), FactKind::Allergy, "penicillin")
            .await
            .unwrap();
        id
    };

    let mut reopened = open(&dir).await;
    let session = reopened.get_session(&session_id).expect("session restored");
    assert!(session.is_active());
    assert_eq!(session.user_message_count(), 1);
    assert_eq!(session.feedback().len(), 1);
    assert_eq!(reopened.get_feedback_summary().helpful, 1);
    assert!(reopened.state().access.trial.has_used_trial);
    assert_eq!(
        reopened.resume_session(&member()).unwrap().id(),
        &session_id
    );

    let allergies = reopened.member_memory(&member()).await.facts(FactKind::Allergy);
    assert_eq!(allergies.len(), 1);
    assert_eq!(allergies[0].content, "penicillin");
}

#[tokio::test]
async fn deleting_memory_removes_the_stored_record() {
    let dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(dir.path());

    let mut assistant = open(&dir).await;
    assistant
        .record_reported_fact(&member(), FactKind::Condition, "asthma")
        .await
        .unwrap();
    assert_eq!(
        store.keys_with_prefix("carebow/memory/").await.unwrap(),
        vec!["carebow/memory/grandma".to_string()]
    );

    assistant.delete_member_memory(&member()).await.unwrap();
    assert!(store.keys_with_prefix("carebow/memory/").await.unwrap().is_empty());

    let mut reopened = open(&dir).await;
    assert!(reopened
        .member_memory(&member())
        .await
        .facts(FactKind::Condition)
        .is_empty());
}

#[tokio::test]
async fn free_text_member_ids_keep_and_delete_their_memory() {
    let dir = TempDir::new().unwrap();
    let store = FileKeyValueStore::new(dir.path());

    for raw in ["Grandma Rose", "mom@family.com"] {
        let id = MemberId::new(raw).unwrap();
        {
            let mut assistant = open(&dir).await;
            assistant
                .start_new_session(UserId::new("me").unwrap(), id.clone())
                .await
                .unwrap();
            assistant
                .record_reported_fact(&id, FactKind::Allergy, "penicillin")
                .await
                .unwrap();
        }

        let mut reopened = open(&dir).await;
        let allergies = reopened.member_memory(&id).await.facts(FactKind::Allergy);
        assert_eq!(allergies.len(), 1, "memory for {raw} was not saved");
        assert_eq!(allergies[0].content, "penicillin");

        reopened.delete_member_memory(&id).await.unwrap();
        assert!(store.keys_with_prefix("carebow/memory/").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn missing_data_directory_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-yet-created");

    let assistant = CareAssistant::load(
        AssistantConfig::default(),
        Arc::new(FileKeyValueStore::new(&path)),
        Arc::new(InMemoryProfileReader::new()),
        Arc::new(StubBookingGateway::new()),
    )
    .await;

    assert!(assistant.get_recent_sessions(10).is_empty());
    assert_eq!(assistant.get_feedback_summary().total, 0);
    assert!(assistant.can_ask_question());
}
