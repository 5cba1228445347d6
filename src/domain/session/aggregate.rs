//! Ask CareBow session aggregate.
//!
//! One continuous conversation about one health concern for one member.

use serde::{Deserialize, Serialize};

use super::errors::SessionError;
use super::export::{ExportFormat, ExportRecord};
use super::summary::{generate_session_summary, SessionSummary};
use crate::domain::conversation::{
    ConversationEngine, ConversationPhase, ConversationState, FollowUpQuestionType, Message,
    TurnContext, TurnOutcome, GREETING,
};
use crate::domain::feedback::FeedbackEntry;
use crate::domain::foundation::{MemberId, MessageId, SessionId, Timestamp, UserId};
use crate::domain::guidance::SuggestedAction;
use crate::domain::memory::EpisodeDigest;
use crate::domain::triage::{
    push_unique, EmergencyState, HealthContext, HealthContextUpdate, MemberProfile, TriageLevel,
    TriageResult, UrgencyLevel,
};

/// Session aggregate root.
///
/// # Invariants
///
/// - `messages` is append-only
/// - An inactive session rejects conversational mutations; audit records
///   (feedback, exports, booking links) may still be attached
/// - `health_context` mirrors the conversation state's context
/// - `triggered_emergency_flow` never goes back to false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskCarebowSession {
    id: SessionId,
    user_id: UserId,
    member_id: MemberId,
    messages: Vec<Message>,
    conversation_state: ConversationState,
    health_context: HealthContext,
    /// What memory pre-filled at start, kept apart from what was said.
    #[serde(default)]
    seeded: HealthContext,
    urgency_level: Option<UrgencyLevel>,
    risk_level: Option<TriageLevel>,
    last_assessment: Option<TriageResult>,
    emergency: EmergencyState,
    recommended_services: Vec<String>,
    detected_symptoms: Vec<String>,
    suggested_actions: Vec<SuggestedAction>,
    linked_order_id: Option<String>,
    linked_request_id: Option<String>,
    triggered_emergency_flow: bool,
    session_summary: Option<SessionSummary>,
    feedback: Vec<FeedbackEntry>,
    export_history: Vec<ExportRecord>,
    profile: Option<MemberProfile>,
    is_active: bool,
    started_at: Timestamp,
    updated_at: Timestamp,
    ended_at: Option<Timestamp>,
}

impl AskCarebowSession {
    /// Opens a session with the greeting already in the log.
    pub fn start(
        user_id: UserId,
        member_id: MemberId,
        profile: Option<MemberProfile>,
        seed: HealthContext,
        now: Timestamp,
    ) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            member_id,
            messages: vec![Message::assistant_text(GREETING, now)],
            conversation_state: ConversationState::with_context(seed.clone()),
            health_context: seed.clone(),
            seeded: seed,
            urgency_level: None,
            risk_level: None,
            last_assessment: None,
            emergency: EmergencyState::clear(),
            recommended_services: Vec::new(),
            detected_symptoms: Vec::new(),
            suggested_actions: Vec::new(),
            linked_order_id: None,
            linked_request_id: None,
            triggered_emergency_flow: false,
            session_summary: None,
            feedback: Vec::new(),
            export_history: Vec::new(),
            profile,
            is_active: true,
            started_at: now,
            updated_at: now,
            ended_at: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversation_state(&self) -> &ConversationState {
        &self.conversation_state
    }

    pub fn phase(&self) -> ConversationPhase {
        self.conversation_state.phase()
    }

    pub fn health_context(&self) -> &HealthContext {
        &self.health_context
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        self.urgency_level
    }

    pub fn risk_level(&self) -> Option<TriageLevel> {
        self.risk_level
    }

    pub fn last_assessment(&self) -> Option<&TriageResult> {
        self.last_assessment.as_ref()
    }

    pub fn emergency(&self) -> &EmergencyState {
        &self.emergency
    }

    pub fn recommended_services(&self) -> &[String] {
        &self.recommended_services
    }

    pub fn detected_symptoms(&self) -> &[String] {
        &self.detected_symptoms
    }

    pub fn suggested_actions(&self) -> &[SuggestedAction] {
        &self.suggested_actions
    }

    pub fn linked_order_id(&self) -> Option<&str> {
        self.linked_order_id.as_deref()
    }

    pub fn linked_request_id(&self) -> Option<&str> {
        self.linked_request_id.as_deref()
    }

    pub fn triggered_emergency_flow(&self) -> bool {
        self.triggered_emergency_flow
    }

    pub fn session_summary(&self) -> Option<&SessionSummary> {
        self.session_summary.as_ref()
    }

    pub fn feedback(&self) -> &[FeedbackEntry] {
        &self.feedback
    }

    pub fn export_history(&self) -> &[ExportRecord] {
        &self.export_history
    }

    pub fn profile(&self) -> Option<&MemberProfile> {
        self.profile.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    pub fn find_message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_user())
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }

    /// All user-authored text, one message per line.
    pub fn user_transcript(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.is_user())
            .map(Message::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_feedback(&self) -> bool {
        !self.feedback.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a user message and the assistant's replies.
    ///
    /// # Errors
    ///
    /// - `Inactive` if the session has ended
    /// - `Validation` if the text is blank
    pub fn receive_user_message(
        &mut self,
        engine: &ConversationEngine,
        text: &str,
        now: Timestamp,
    ) -> Result<TurnOutcome, SessionError> {
        self.ensure_active()?;
        let message = Message::user(text, now)?;
        let text = message.text().to_string();
        self.messages.push(message);

        let transcript = self.user_transcript();
        let turn = TurnContext {
            member_id: &self.member_id,
            profile: self.profile.as_ref(),
            user_transcript: &transcript,
            now,
        };
        let outcome = engine.respond(&mut self.conversation_state, &text, turn)?;

        self.messages.extend(outcome.replies.iter().cloned());
        self.sync_context();
        if outcome.emergency.is_emergency && !self.triggered_emergency_flow {
            self.triggered_emergency_flow = true;
            self.emergency = outcome.emergency.clone();
        }
        if let Some(result) = &outcome.assessment {
            self.urgency_level = Some(result.urgency_level);
            self.risk_level = Some(result.level);
            self.last_assessment = Some(result.clone());
        }
        if let Some(guidance) = &outcome.guidance {
            self.suggested_actions = guidance.suggested_actions.clone();
            self.recommended_services = guidance
                .suggested_actions
                .iter()
                .filter_map(|a| a.action_type.service_name())
                .map(str::to_string)
                .collect();
        }
        self.touch(now);
        Ok(outcome)
    }

    /// # Errors
    ///
    /// - `Inactive` if the session has ended
    pub fn mark_question_asked(
        &mut self,
        question: FollowUpQuestionType,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.conversation_state.mark_question_asked(question);
        self.touch(now);
        Ok(())
    }

    /// # Errors
    ///
    /// - `Inactive` if the session has ended
    pub fn set_current_question(
        &mut self,
        question: Option<FollowUpQuestionType>,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.conversation_state.set_current_question(question);
        self.touch(now);
        Ok(())
    }

    /// # Errors
    ///
    /// - `Inactive` if the session has ended
    pub fn update_health_context(
        &mut self,
        update: HealthContextUpdate,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.conversation_state.update_health_context(update);
        self.sync_context();
        self.touch(now);
        Ok(())
    }

    /// Records that the user picked the suggested action at `index`.
    ///
    /// Moves the conversation to service routing unless it is an emergency.
    ///
    /// # Errors
    ///
    /// - `Inactive` if the session has ended
    /// - `ActionNotFound` if there is no action at `index`
    pub fn act_on_suggested_action(
        &mut self,
        index: usize,
        now: Timestamp,
    ) -> Result<SuggestedAction, SessionError> {
        self.ensure_active()?;
        let action = self
            .suggested_actions
            .get(index)
            .cloned()
            .ok_or(SessionError::ActionNotFound(index))?;
        if self.phase().has_guidance() {
            self.conversation_state
                .transition_to(ConversationPhase::ServiceRouting)?;
        }
        self.messages
            .push(Message::service_recommendation(action.clone(), now));
        self.touch(now);
        Ok(action)
    }

    /// Ends the session and freezes its summary. Ending is terminal.
    ///
    /// # Errors
    ///
    /// - `Inactive` if the session has already ended
    pub fn end(&mut self, now: Timestamp) -> Result<&SessionSummary, SessionError> {
        self.ensure_active()?;
        self.conversation_state
            .transition_to(ConversationPhase::Completed)?;
        self.is_active = false;
        self.ended_at = Some(now);
        self.touch(now);
        let summary = generate_session_summary(self);
        Ok(self.session_summary.insert(summary))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Audit records
    // ─────────────────────────────────────────────────────────────────────────

    pub fn link_booking(&mut self, order_id: Option<String>, request_id: Option<String>, now: Timestamp) {
        if order_id.is_some() {
            self.linked_order_id = order_id;
        }
        if request_id.is_some() {
            self.linked_request_id = request_id;
        }
        self.touch(now);
    }

    pub fn attach_feedback(&mut self, entry: FeedbackEntry) {
        self.feedback.push(entry);
    }

    pub fn record_export(&mut self, format: ExportFormat, now: Timestamp) {
        self.export_history.push(ExportRecord {
            format,
            exported_at: now,
        });
    }

    /// What this session contributes to the member's memory.
    pub fn digest(&self) -> EpisodeDigest {
        let chief_complaint = self
            .session_summary
            .as_ref()
            .map(|s| s.chief_complaint.clone())
            .unwrap_or_else(|| generate_session_summary(self).chief_complaint);
        EpisodeDigest {
            episode_id: self.id,
            chief_complaint,
            context: self.mentioned_context(),
            urgency_level: self.urgency_level,
            triggered_emergency: self.triggered_emergency_flow,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active {
            Ok(())
        } else {
            Err(SessionError::Inactive(self.id))
        }
    }

    fn sync_context(&mut self) {
        self.health_context = self.conversation_state.health_context().clone();
        if self.health_context.has_primary_symptom() {
            push_unique(&mut self.detected_symptoms, &self.health_context.primary_symptom);
        }
        for symptom in &self.health_context.associated_symptoms {
            push_unique(&mut self.detected_symptoms, symptom);
        }
    }

    /// The health context without seeded facts the user never brought up.
    fn mentioned_context(&self) -> HealthContext {
        let transcript = self.user_transcript().to_lowercase();
        let keep = |seeded: &[String], item: &String| {
            !seeded.iter().any(|s| s.eq_ignore_ascii_case(item))
                || transcript.contains(&item.to_lowercase())
        };
        let mut context = self.health_context.clone();
        context
            .chronic_conditions
            .retain(|c| keep(&self.seeded.chronic_conditions, c));
        context
            .medications
            .retain(|m| keep(&self.seeded.medications, m));
        context.allergies.retain(|a| keep(&self.seeded.allergies, a));
        context
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}
