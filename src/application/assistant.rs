//! CareAssistant - the application service behind Ask CareBow.
//!
//! Owns the assistant state, the per-member memories and the feedback ledger,
//! runs every public operation to completion, and snapshots the affected
//! record set after each mutation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::AssistantError;
use super::persistence::Persistence;
use super::queries;
use super::state::AssistantState;
use crate::config::AssistantConfig;
use crate::domain::conversation::{ConversationEngine, TurnOutcome};
use crate::domain::feedback::{FeedbackEntry, FeedbackLedger, FeedbackSubmission, FeedbackSummary};
use crate::domain::foundation::{CandidateId, FactId, MemberId, SessionId, Timestamp, UserId};
use crate::domain::guidance::SuggestedAction;
use crate::domain::membership::{AccessGrant, AccessResult};
use crate::domain::memory::{
    FactKind, FactSource, HealthFact, MemberHealthMemory, MemoryCandidate, MemoryLimits,
};
use crate::domain::session::{
    export_json, export_text, AskCarebowSession, ExportFormat, SessionError, SessionSummary,
};
use crate::ports::{
    BookingConfirmation, BookingGateway, BookingRequest, KeyValueStore, MemberProfileReader,
};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// A freshly opened session.
#[derive(Debug, Clone)]
pub struct SessionStarted {
    pub session: AskCarebowSession,
    /// Symptoms this member has reported in two or more earlier sessions.
    pub recurring_symptoms: Vec<String>,
}

/// A session that was just ended.
#[derive(Debug, Clone)]
pub struct SessionEnded {
    pub summary: SessionSummary,
    /// Facts proposed for the member's memory, awaiting confirmation.
    pub proposed_candidates: Vec<MemoryCandidate>,
}

/// The action the user picked and what booking made of it.
#[derive(Debug, Clone)]
pub struct ActionTaken {
    pub action: SuggestedAction,
    pub booking: Option<BookingConfirmation>,
}

pub struct CareAssistant {
    state: AssistantState,
    feedback: FeedbackLedger,
    memories: HashMap<MemberId, MemberHealthMemory>,
    engine: ConversationEngine,
    persistence: Persistence,
    profiles: Arc<dyn MemberProfileReader>,
    booking: Arc<dyn BookingGateway>,
    config: AssistantConfig,
    clock: Clock,
}

impl std::fmt::Debug for CareAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareAssistant")
            .field("sessions", &self.state.sessions.len())
            .field("feedback", &self.feedback.entries().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CareAssistant {
    /// Creates an assistant with fresh state. Nothing is read from the store.
    pub fn new(
        config: AssistantConfig,
        store: Arc<dyn KeyValueStore>,
        profiles: Arc<dyn MemberProfileReader>,
        booking: Arc<dyn BookingGateway>,
    ) -> Self {
        let mut state = AssistantState::default();
        Self::apply_access_config(&mut state, &config);
        Self {
            state,
            feedback: FeedbackLedger::new(),
            memories: HashMap::new(),
            engine: ConversationEngine::new(Arc::new(config.readiness_policy())),
            persistence: Persistence::new(store),
            profiles,
            booking,
            config,
            clock: Arc::new(Timestamp::now),
        }
    }

    /// Creates an assistant from whatever the store holds. Unreadable records
    /// are logged and replaced by empty ones.
    pub async fn load(
        config: AssistantConfig,
        store: Arc<dyn KeyValueStore>,
        profiles: Arc<dyn MemberProfileReader>,
        booking: Arc<dyn BookingGateway>,
    ) -> Self {
        let mut assistant = Self::new(config, store, profiles, booking);
        let mut state = assistant.persistence.load_assistant().await;
        Self::apply_access_config(&mut state, &assistant.config);
        assistant.state = state;
        assistant.feedback = assistant.persistence.load_feedback().await;
        info!(
            sessions = assistant.state.sessions.len(),
            feedback = assistant.feedback.entries().len(),
            "assistant state loaded"
        );
        assistant
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn apply_access_config(state: &mut AssistantState, config: &AssistantConfig) {
        state.access.trial_days = config.trial_days;
        state.access.free_question_quota = config.free_question_quota;
    }

    fn now(&self) -> Timestamp {
        (self.clock)()
    }

    fn limits(&self) -> MemoryLimits {
        self.config.memory_limits()
    }

    pub fn state(&self) -> &AssistantState {
        &self.state
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Opens a session for `member_id`, seeded from the member's profile
    /// and health memory.
    ///
    /// # Errors
    ///
    /// - `AlreadyActive` if the member already has an active session
    pub async fn start_new_session(
        &mut self,
        user_id: UserId,
        member_id: MemberId,
    ) -> Result<SessionStarted, AssistantError> {
        if self.state.active_session_for(&member_id).is_some() {
            return Err(SessionError::AlreadyActive(member_id).into());
        }
        let now = self.now();

        let profile = match self.profiles.get_profile(&member_id).await {
            Ok(profile) => profile,
            Err(error) => {
                warn!(member_id = %member_id, %error, "profile lookup failed, continuing without it");
                None
            }
        };
        let seed = self.memory(&member_id).await.context_for_new_session();

        let session = AskCarebowSession::start(user_id, member_id.clone(), profile, seed.context, now);
        info!(
            session_id = %session.id(),
            member_id = %member_id,
            recurring = seed.recurring_symptoms.len(),
            "session started"
        );
        self.state.sessions.push(session.clone());
        let dropped = self.state.trim_history(self.config.max_sessions);
        if dropped > 0 {
            debug!(dropped, "old sessions dropped from history");
        }
        self.persistence.save_assistant(&self.state).await;

        Ok(SessionStarted {
            session,
            recurring_symptoms: seed.recurring_symptoms,
        })
    }

    /// The member's active session.
    ///
    /// # Errors
    ///
    /// - `NoActiveSession` if the member has none
    pub fn resume_session(&self, member_id: &MemberId) -> Result<&AskCarebowSession, AssistantError> {
        self.state
            .active_session_for(member_id)
            .ok_or_else(|| SessionError::NoActiveSession(member_id.clone()).into())
    }

    pub fn get_session(&self, session_id: &SessionId) -> Option<&AskCarebowSession> {
        self.state.session(session_id)
    }

    fn session_mut(&mut self, session_id: &SessionId) -> Result<&mut AskCarebowSession, SessionError> {
        self.state
            .session_mut(session_id)
            .ok_or(SessionError::NotFound(*session_id))
    }

    /// Processes one user utterance, typed or transcribed.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Inactive` for unknown or ended sessions
    /// - `AccessDenied` when the trial is over and the free quota is spent
    /// - `Validation` for blank text
    pub async fn send_message(
        &mut self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<TurnOutcome, AssistantError> {
        let now = self.now();
        let grant = match self.state.access.check_access(now) {
            AccessResult::Allowed(grant) => grant,
            AccessResult::Denied(reason) => {
                info!(session_id = %session_id, %reason, "question blocked by access gate");
                return Err(AssistantError::AccessDenied(reason));
            }
        };

        let engine = &self.engine;
        let session = self
            .state
            .sessions
            .iter_mut()
            .find(|s| s.id() == session_id)
            .ok_or(SessionError::NotFound(*session_id))?;
        let outcome = session.receive_user_message(engine, text, now)?;

        if grant == AccessGrant::TrialEligible && self.state.access.start_trial(now) {
            info!("free trial started");
        }
        self.state.access.record_question_asked(now);

        if outcome.emergency.is_emergency {
            warn!(
                session_id = %session_id,
                matched = ?outcome.emergency.matched_phrases,
                "emergency flow active"
            );
        } else if let Some(result) = &outcome.assessment {
            info!(
                session_id = %session_id,
                urgency = ?result.urgency_level,
                confidence = %result.confidence,
                "assessment produced"
            );
        }
        self.persistence.save_assistant(&self.state).await;
        Ok(outcome)
    }

    /// Acts on the suggested action at `index` and hands bookable actions
    /// to the booking gateway. A booking failure is logged, not returned.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Inactive` for unknown or ended sessions
    /// - `ActionNotFound` if there is no action at `index`
    pub async fn act_on_suggested_action(
        &mut self,
        session_id: &SessionId,
        index: usize,
    ) -> Result<ActionTaken, AssistantError> {
        let now = self.now();
        let action = self.session_mut(session_id)?.act_on_suggested_action(index, now)?;

        let mut booking = None;
        if let Some(request) = BookingRequest::from_action(*session_id, &action) {
            match self.booking.submit(request).await {
                Ok(confirmation) => {
                    info!(
                        session_id = %session_id,
                        order_id = ?confirmation.order_id,
                        request_id = ?confirmation.request_id,
                        "booking submitted"
                    );
                    self.session_mut(session_id)?.link_booking(
                        confirmation.order_id.clone(),
                        confirmation.request_id.clone(),
                        now,
                    );
                    booking = Some(confirmation);
                }
                Err(error) => {
                    warn!(session_id = %session_id, %error, "booking submission failed");
                }
            }
        }
        self.persistence.save_assistant(&self.state).await;
        Ok(ActionTaken { action, booking })
    }

    /// Ends the session, freezes its summary and folds it into the member's
    /// health memory.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Inactive` for unknown or already ended sessions
    pub async fn end_session(&mut self, session_id: &SessionId) -> Result<SessionEnded, AssistantError> {
        let now = self.now();
        let session = self.session_mut(session_id)?;
        let summary = session.end(now)?.clone();
        let digest = session.digest();
        let member_id = session.member_id().clone();

        let limits = self.limits();
        let memory = self.memory(&member_id).await;
        let proposed = memory.ingest_episode(&digest, now, &limits);
        let proposed_candidates = memory
            .candidates()
            .iter()
            .filter(|c| proposed.contains(&c.id))
            .cloned()
            .collect::<Vec<_>>();
        let memory = memory.clone();

        info!(
            session_id = %session_id,
            member_id = %member_id,
            candidates = proposed_candidates.len(),
            "session ended"
        );
        self.persistence.save_assistant(&self.state).await;
        self.persistence.save_memory(&memory).await;
        Ok(SessionEnded {
            summary,
            proposed_candidates,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exports
    // ─────────────────────────────────────────────────────────────────────────

    /// Plain-text clinical note. Recorded in the session's export history.
    pub async fn get_session_export_text(&mut self, session_id: &SessionId) -> Result<String, AssistantError> {
        let now = self.now();
        let session = self.session_mut(session_id)?;
        let text = export_text(session, now);
        session.record_export(ExportFormat::Text, now);
        self.persistence.save_assistant(&self.state).await;
        Ok(text)
    }

    /// JSON envelope. Recorded in the session's export history.
    pub async fn get_session_export_json(&mut self, session_id: &SessionId) -> Result<String, AssistantError> {
        let now = self.now();
        let session = self.session_mut(session_id)?;
        let json = export_json(session, now)?;
        session.record_export(ExportFormat::Json, now);
        self.persistence.save_assistant(&self.state).await;
        Ok(json)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_sessions_for_member(&self, member_id: &MemberId) -> Vec<&AskCarebowSession> {
        queries::sessions_for_member(&self.state.sessions, member_id)
    }

    pub fn get_recent_sessions(&self, limit: usize) -> Vec<&AskCarebowSession> {
        queries::recent_sessions(&self.state.sessions, limit)
    }

    pub fn get_emergency_sessions(&self) -> Vec<&AskCarebowSession> {
        queries::emergency_sessions(&self.state.sessions)
    }

    pub fn get_sessions_with_feedback(&self) -> Vec<&AskCarebowSession> {
        queries::sessions_with_feedback(&self.state.sessions)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Feedback
    // ─────────────────────────────────────────────────────────────────────────

    /// Rates one message. Ended sessions can still be rated.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the episode is unknown
    /// - `MessageNotFound` if the message is not in that episode
    /// - `ReasonWithoutNegativeRating` if a helpful rating carries a reason
    pub async fn submit_feedback(
        &mut self,
        submission: FeedbackSubmission,
    ) -> Result<FeedbackEntry, AssistantError> {
        let now = self.now();
        let episode_id = submission.episode_id;
        let message_id = submission.message_id;
        let session = self.session_mut(&episode_id)?;
        let message_text = session
            .find_message(&message_id)
            .ok_or(SessionError::MessageNotFound(message_id))?
            .text()
            .to_string();

        let entry = FeedbackEntry::new(submission, &message_text, now)?;
        session.attach_feedback(entry.clone());
        self.feedback.record(entry.clone());
        info!(
            session_id = %episode_id,
            rating = ?entry.rating,
            reason = ?entry.reason,
            "feedback recorded"
        );

        self.persistence.save_feedback(&self.feedback).await;
        self.persistence.save_assistant(&self.state).await;
        Ok(entry)
    }

    pub fn get_feedback_summary(&self) -> FeedbackSummary {
        self.feedback.summary()
    }

    pub fn feedback_ledger(&self) -> &FeedbackLedger {
        &self.feedback
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Trial and subscription
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts the one-time trial. Returns false if it was already used.
    pub async fn start_trial(&mut self) -> bool {
        let started = self.state.access.start_trial(self.now());
        if started {
            info!(days = self.state.access.trial_days, "free trial started");
            self.persistence.save_assistant(&self.state).await;
        }
        started
    }

    pub async fn set_subscribed(&mut self, subscribed: bool) {
        self.state.access.set_subscribed(subscribed);
        info!(subscribed, "subscription updated");
        self.persistence.save_assistant(&self.state).await;
    }

    pub fn can_ask_question(&self) -> bool {
        self.state.access.can_ask_question(self.now())
    }

    pub fn access_status(&self) -> AccessResult {
        self.state.access.check_access(self.now())
    }

    /// Whole days left in the trial, rounded up. Zero once it has ended.
    pub fn trial_days_remaining(&self) -> i64 {
        self.state.access.trial.days_remaining(self.now())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Member health memory
    // ─────────────────────────────────────────────────────────────────────────

    /// The member's memory, loaded from the store on first use.
    async fn memory(&mut self, member_id: &MemberId) -> &mut MemberHealthMemory {
        let now = self.now();
        if !self.memories.contains_key(member_id) {
            let loaded = self.persistence.load_memory(member_id, now).await;
            self.memories.insert(member_id.clone(), loaded);
        }
        self.memories
            .entry(member_id.clone())
            .or_insert_with(|| MemberHealthMemory::new(member_id.clone(), now))
    }

    pub async fn member_memory(&mut self, member_id: &MemberId) -> &MemberHealthMemory {
        self.memory(member_id).await
    }

    async fn update_memory<T>(
        &mut self,
        member_id: &MemberId,
        change: impl FnOnce(&mut MemberHealthMemory, Timestamp) -> Result<T, AssistantError>,
    ) -> Result<T, AssistantError> {
        let now = self.now();
        let memory = self.memory(member_id).await;
        let result = change(memory, now)?;
        let snapshot = memory.clone();
        self.persistence.save_memory(&snapshot).await;
        Ok(result)
    }

    /// Records whether the user accepted a proposed fact.
    pub async fn process_memory_candidate(
        &mut self,
        member_id: &MemberId,
        candidate_id: CandidateId,
        accepted: bool,
    ) -> Result<(), AssistantError> {
        self.update_memory(member_id, |memory, now| {
            Ok(memory.process_candidate(candidate_id, accepted, now)?)
        })
        .await?;
        debug!(member_id = %member_id, candidate_id = %candidate_id, accepted, "candidate processed");
        Ok(())
    }

    /// Merges an accepted candidate into the member's facts.
    pub async fn promote_memory_candidate(
        &mut self,
        member_id: &MemberId,
        candidate_id: CandidateId,
    ) -> Result<FactId, AssistantError> {
        let fact_id = self
            .update_memory(member_id, |memory, now| {
                Ok(memory.promote_candidate(candidate_id, now)?)
            })
            .await?;
        info!(member_id = %member_id, fact_id = %fact_id, "candidate promoted");
        Ok(fact_id)
    }

    /// Adds a fact the user stated directly.
    pub async fn record_reported_fact(
        &mut self,
        member_id: &MemberId,
        kind: FactKind,
        content: &str,
    ) -> Result<FactId, AssistantError> {
        self.update_memory(member_id, |memory, now| {
            Ok(memory.record_fact(kind, content, FactSource::UserReported, None, now))
        })
        .await
    }

    pub async fn remove_fact(
        &mut self,
        member_id: &MemberId,
        kind: FactKind,
        fact_id: FactId,
    ) -> Result<HealthFact, AssistantError> {
        let removed = self
            .update_memory(member_id, |memory, now| Ok(memory.remove_fact(kind, fact_id, now)?))
            .await?;
        info!(member_id = %member_id, fact_id = %fact_id, "fact removed");
        Ok(removed)
    }

    /// Forgets everything stored about a member.
    ///
    /// # Errors
    ///
    /// - `Storage` if the stored record could not be deleted
    pub async fn delete_member_memory(&mut self, member_id: &MemberId) -> Result<(), AssistantError> {
        self.memories.remove(member_id);
        self.persistence.delete_memory(member_id).await?;
        info!(member_id = %member_id, "member memory deleted");
        Ok(())
    }

    /// Writes every record set now, reporting failures instead of logging
    /// them.
    pub async fn persist_all(&self) -> Result<(), AssistantError> {
        self.persistence
            .flush(&self.state, &self.feedback, self.memories.values())
            .await?;
        Ok(())
    }
}
