//! Per-session conversation state.

use serde::{Deserialize, Serialize};

use super::phase::ConversationPhase;
use super::question::FollowUpQuestionType;
use crate::domain::foundation::{StateMachine, ValidationError};
use crate::domain::triage::{HealthContext, HealthContextUpdate, UrgencyLevel};

/// Progress through the follow-up questions plus the gathered context.
///
/// # Invariants
///
/// - Every [`FollowUpQuestionType`] is in exactly one of `questions_asked`
///   or `questions_remaining`
/// - `questions_remaining` keeps the fixed question order
/// - `phase` only changes through valid [`StateMachine`] transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    phase: ConversationPhase,
    questions_asked: Vec<FollowUpQuestionType>,
    questions_remaining: Vec<FollowUpQuestionType>,
    current_question: Option<FollowUpQuestionType>,
    health_context: HealthContext,
    urgency_level: Option<UrgencyLevel>,
    has_provided_guidance: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::with_context(HealthContext::new())
    }

    /// Starts from a pre-seeded context (known conditions, medications...).
    pub fn with_context(health_context: HealthContext) -> Self {
        Self {
            phase: ConversationPhase::Initial,
            questions_asked: Vec::new(),
            questions_remaining: FollowUpQuestionType::ALL.to_vec(),
            current_question: None,
            health_context,
            urgency_level: None,
            has_provided_guidance: false,
        }
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn questions_asked(&self) -> &[FollowUpQuestionType] {
        &self.questions_asked
    }

    pub fn questions_remaining(&self) -> &[FollowUpQuestionType] {
        &self.questions_remaining
    }

    pub fn current_question(&self) -> Option<FollowUpQuestionType> {
        self.current_question
    }

    pub fn health_context(&self) -> &HealthContext {
        &self.health_context
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        self.urgency_level
    }

    pub fn has_provided_guidance(&self) -> bool {
        self.has_provided_guidance
    }

    pub fn is_emergency(&self) -> bool {
        self.phase == ConversationPhase::Emergency
    }

    /// Moves to `target`, rejecting transitions the phase machine forbids.
    pub fn transition_to(&mut self, target: ConversationPhase) -> Result<(), ValidationError> {
        self.phase = self.phase.transition_to(target)?;
        if !self.phase.asks_questions() {
            self.current_question = None;
        }
        Ok(())
    }

    /// Moves a question from remaining to asked. Asking twice is a no-op.
    pub fn mark_question_asked(&mut self, question: FollowUpQuestionType) {
        if let Some(pos) = self.questions_remaining.iter().position(|q| *q == question) {
            self.questions_remaining.remove(pos);
            self.questions_asked.push(question);
        }
    }

    pub fn set_current_question(&mut self, question: Option<FollowUpQuestionType>) {
        self.current_question = question;
    }

    pub fn update_health_context(&mut self, update: HealthContextUpdate) {
        self.health_context.apply(update);
    }

    pub fn append_note(&mut self, note: &str) {
        self.health_context.append_note(note);
    }

    /// Retires every remaining question the context already answers.
    ///
    /// Returns the first question that still needs asking.
    pub fn next_open_question(&mut self) -> Option<FollowUpQuestionType> {
        let answered: Vec<_> = self
            .questions_remaining
            .iter()
            .copied()
            .filter(|q| q.is_answered_by(&self.health_context))
            .collect();
        for question in answered {
            self.mark_question_asked(question);
        }
        self.questions_remaining.first().copied()
    }

    pub fn record_assessment(&mut self, urgency: UrgencyLevel) {
        self.urgency_level = Some(urgency);
        self.has_provided_guidance = true;
    }
}
