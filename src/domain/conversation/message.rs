//! Conversation messages.
//!
//! Messages are immutable records appended to a session's log.

use serde::{Deserialize, Serialize};

use super::question::FollowUpQuestionType;
use crate::domain::foundation::{MessageId, Timestamp, ValidationError};
use crate::domain::guidance::{GuidanceResponse, SuggestedAction};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// What kind of content a message carries, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Question,
    Guidance,
    ServiceRecommendation,
    EmergencyAlert,
    QuickOptions,
}

/// Structured extras attached to assistant messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<GuidanceResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<SuggestedAction>,
    #[serde(default)]
    pub is_emergency: bool,
}

/// An immutable message within a session.
///
/// # Invariants
///
/// - `id` is unique
/// - user text is non-empty (validated at construction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content_type: ContentType,
    text: String,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<MessagePayload>,
}

impl Message {
    fn build(
        role: Role,
        content_type: ContentType,
        text: impl Into<String>,
        payload: Option<MessagePayload>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content_type,
            text: text.into(),
            timestamp,
            payload,
        }
    }

    /// Creates a user message, typed or transcribed.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is blank
    pub fn user(text: &str, timestamp: Timestamp) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(Self::build(Role::User, ContentType::Text, text, None, timestamp))
    }

    pub fn assistant_text(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self::build(Role::Assistant, ContentType::Text, text, None, timestamp)
    }

    pub fn system(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self::build(Role::System, ContentType::Text, text, None, timestamp)
    }

    /// A follow-up question with its quick options.
    pub fn question(question: FollowUpQuestionType, timestamp: Timestamp) -> Self {
        let payload = MessagePayload {
            quick_options: question.quick_options(),
            ..MessagePayload::default()
        };
        Self::build(
            Role::Assistant,
            ContentType::Question,
            question.prompt(),
            Some(payload),
            timestamp,
        )
    }

    pub fn guidance(guidance: GuidanceResponse, timestamp: Timestamp) -> Self {
        let text = guidance.to_text();
        let payload = MessagePayload {
            suggested_actions: guidance.suggested_actions.clone(),
            is_emergency: false,
            guidance: Some(guidance),
            ..MessagePayload::default()
        };
        Self::build(Role::Assistant, ContentType::Guidance, text, Some(payload), timestamp)
    }

    pub fn emergency_alert(guidance: GuidanceResponse, timestamp: Timestamp) -> Self {
        let text = format!(
            "This may be an emergency. Please call your local emergency number now.\n\n{}",
            guidance.to_text()
        );
        let payload = MessagePayload {
            suggested_actions: guidance.suggested_actions.clone(),
            is_emergency: true,
            guidance: Some(guidance),
            ..MessagePayload::default()
        };
        Self::build(
            Role::Assistant,
            ContentType::EmergencyAlert,
            text,
            Some(payload),
            timestamp,
        )
    }

    pub fn service_recommendation(action: SuggestedAction, timestamp: Timestamp) -> Self {
        let text = format!("{}: {}", action.label, action.description);
        let payload = MessagePayload {
            suggested_actions: vec![action],
            ..MessagePayload::default()
        };
        Self::build(
            Role::Assistant,
            ContentType::ServiceRecommendation,
            text,
            Some(payload),
            timestamp,
        )
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn payload(&self) -> Option<&MessagePayload> {
        self.payload.as_ref()
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_emergency(&self) -> bool {
        self.payload.as_ref().map_or(false, |p| p.is_emergency)
    }

    pub fn suggested_actions(&self) -> &[SuggestedAction] {
        self.payload
            .as_ref()
            .map_or(&[], |p| p.suggested_actions.as_slice())
    }
}
