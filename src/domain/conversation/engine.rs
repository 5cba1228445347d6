//! Turn processing.
//!
//! Applies one user utterance to the conversation state and decides the
//! assistant's reply: an emergency alert, the next follow-up question, or
//! guidance.

use std::sync::Arc;

use super::extractor::KeywordExtractor;
use super::message::Message;
use super::phase::ConversationPhase;
use super::question::FollowUpQuestionType;
use super::readiness::{MinimumContextPolicy, ReadinessPolicy};
use super::state::ConversationState;
use crate::domain::foundation::{MemberId, Timestamp, ValidationError};
use crate::domain::guidance::{GuidanceGenerator, GuidanceResponse};
use crate::domain::triage::{
    EmergencyState, MemberProfile, RedFlagDetector, TriageEngine, TriageInput, TriageResult,
    UrgencyLevel,
};

/// Opening message of every session.
pub const GREETING: &str = "Hi, I'm here to help you work out the next step for a health \
concern. What's been bothering you?";

const EMERGENCY_REMINDER: &str = "Please call your local emergency number now. If help is \
already on the way, stay with the person until it arrives.";

/// Everything the engine needs about the member for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub member_id: &'a MemberId,
    pub profile: Option<&'a MemberProfile>,
    /// All user-authored text in the session so far, this turn included.
    pub user_transcript: &'a str,
    pub now: Timestamp,
}

/// What one turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub emergency: EmergencyState,
    pub assessment: Option<TriageResult>,
    pub guidance: Option<GuidanceResponse>,
    pub asked: Option<FollowUpQuestionType>,
    pub replies: Vec<Message>,
}

impl TurnOutcome {
    fn new(emergency: EmergencyState) -> Self {
        Self {
            emergency,
            assessment: None,
            guidance: None,
            asked: None,
            replies: Vec::new(),
        }
    }
}

/// Rule-based conversation driver.
#[derive(Debug, Clone)]
pub struct ConversationEngine {
    detector: RedFlagDetector,
    extractor: KeywordExtractor,
    triage: TriageEngine,
    guidance: GuidanceGenerator,
    readiness: Arc<dyn ReadinessPolicy>,
}

impl Default for ConversationEngine {
    fn default() -> Self {
        Self::new(Arc::new(MinimumContextPolicy::default()))
    }
}

impl ConversationEngine {
    pub fn new(readiness: Arc<dyn ReadinessPolicy>) -> Self {
        Self {
            detector: RedFlagDetector::new(),
            extractor: KeywordExtractor::new(),
            triage: TriageEngine::new(),
            guidance: GuidanceGenerator::new(),
            readiness,
        }
    }

    pub fn detector(&self) -> &RedFlagDetector {
        &self.detector
    }

    /// Processes one user utterance.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the conversation is already completed
    pub fn respond(
        &self,
        state: &mut ConversationState,
        text: &str,
        turn: TurnContext<'_>,
    ) -> Result<TurnOutcome, ValidationError> {
        if state.phase() == ConversationPhase::Completed {
            return Err(ValidationError::invalid_format(
                "phase",
                "conversation is completed",
            ));
        }

        let answering = state.current_question();
        let update = self.extractor.extract(text, answering, state.health_context());
        state.update_health_context(update);
        state.set_current_question(None);

        if state.phase() == ConversationPhase::Initial {
            state.transition_to(ConversationPhase::Gathering)?;
        }

        let emergency = self.detector.assess(turn.user_transcript, turn.now);
        let mut outcome = TurnOutcome::new(emergency.clone());

        if state.is_emergency() {
            outcome
                .replies
                .push(Message::assistant_text(EMERGENCY_REMINDER, turn.now));
            return Ok(outcome);
        }

        if emergency.is_emergency {
            state.transition_to(ConversationPhase::Emergency)?;
            let (result, guidance) = self.assess(state, &emergency, &turn);
            state.record_assessment(UrgencyLevel::Emergency);
            outcome
                .replies
                .push(Message::emergency_alert(guidance.clone(), turn.now));
            outcome.assessment = Some(result);
            outcome.guidance = Some(guidance);
            return Ok(outcome);
        }

        if state.phase() == ConversationPhase::Gathering {
            let next = state.next_open_question();
            let ready = self
                .readiness
                .is_ready(state.health_context(), state.questions_asked().len());
            if let (Some(question), false) = (next, ready) {
                state.mark_question_asked(question);
                state.set_current_question(Some(question));
                outcome.asked = Some(question);
                outcome.replies.push(Message::question(question, turn.now));
                return Ok(outcome);
            }
        }

        state.transition_to(ConversationPhase::Assessing)?;
        let (result, guidance) = self.assess(state, &emergency, &turn);
        state.transition_to(ConversationPhase::Guidance)?;
        state.record_assessment(result.urgency_level);
        outcome
            .replies
            .push(Message::guidance(guidance.clone(), turn.now));
        outcome.assessment = Some(result);
        outcome.guidance = Some(guidance);
        Ok(outcome)
    }

    fn assess(
        &self,
        state: &ConversationState,
        emergency: &EmergencyState,
        turn: &TurnContext<'_>,
    ) -> (TriageResult, GuidanceResponse) {
        let result = self.triage.assess(TriageInput {
            context: state.health_context(),
            profile: turn.profile,
            emergency,
            questions_answered: state.questions_asked().len(),
            questions_planned: FollowUpQuestionType::ALL.len(),
        });
        let guidance =
            self.guidance
                .generate(&result, state.health_context(), turn.member_id, turn.now);
        (result, guidance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::message::ContentType;
    use crate::domain::guidance::SuggestedActionType;
    use crate::domain::triage::{EmergencyType, Severity, SymptomDuration};

    struct Harness {
        engine: ConversationEngine,
        state: ConversationState,
        member: MemberId,
        profile: Option<MemberProfile>,
        transcript: String,
    }

    impl Harness {
        fn new(age: Option<u32>) -> Self {
            let member = MemberId::new("member-1").unwrap();
            let profile = age.map(|a| MemberProfile::new(member.clone()).with_age(a));
            Self {
                engine: ConversationEngine::default(),
                state: ConversationState::new(),
                member,
                profile,
                transcript: String::new(),
            }
        }

        fn say(&mut self, text: &str) -> TurnOutcome {
            if !self.transcript.is_empty() {
                self.transcript.push('\n');
            }
            self.transcript.push_str(text);
            let turn = TurnContext {
                member_id: &self.member,
                profile: self.profile.as_ref(),
                user_transcript: &self.transcript,
                now: Timestamp::now(),
            };
            self.engine.respond(&mut self.state, text, turn).unwrap()
        }
    }

    mod gathering {
        use super::*;

        #[test]
        fn first_message_moves_to_gathering_and_asks_a_question() {
            let mut h = Harness::new(Some(30));
            let outcome = h.say("I have a cough");
            assert_eq!(h.state.phase(), ConversationPhase::Gathering);
            assert_eq!(outcome.asked, Some(FollowUpQuestionType::Duration));
            assert_eq!(outcome.replies[0].content_type(), ContentType::Question);
            assert_eq!(h.state.current_question(), Some(FollowUpQuestionType::Duration));
        }

        #[test]
        fn questions_already_answered_are_skipped() {
            let mut h = Harness::new(Some(30));
            let outcome = h.say("mild headache for 2 days");
            assert_eq!(outcome.asked, Some(FollowUpQuestionType::AssociatedSymptoms));
            assert_eq!(h.state.health_context().duration, Some(SymptomDuration::FewDays));
        }

        #[test]
        fn guidance_follows_once_context_is_sufficient() {
            let mut h = Harness::new(Some(30));
            h.say("mild headache for 2 days");
            let outcome = h.say("None of these");
            assert_eq!(outcome.asked, Some(FollowUpQuestionType::Frequency));
            let outcome = h.say("first time");
            assert_eq!(h.state.phase(), ConversationPhase::Guidance);
            let result = outcome.assessment.expect("assessment");
            assert!(matches!(
                result.urgency_level,
                UrgencyLevel::SelfCare | UrgencyLevel::Monitor
            ));
            let guidance = outcome.guidance.expect("guidance");
            assert!(!guidance.has_action(SuggestedActionType::CallEmergency));
            assert!(h.state.has_provided_guidance());
        }

        #[test]
        fn running_out_of_questions_forces_assessment() {
            let mut h = Harness::new(None);
            h.say("my hand feels odd");
            for _ in 0..FollowUpQuestionType::ALL.len() {
                if h.state.phase() != ConversationPhase::Gathering {
                    break;
                }
                h.say("not sure");
            }
            assert_eq!(h.state.phase(), ConversationPhase::Guidance);
            assert!(h.state.questions_remaining().is_empty());
        }

        #[test]
        fn text_after_guidance_refreshes_the_assessment() {
            let mut h = Harness::new(Some(30));
            h.say("mild headache for 2 days");
            h.say("None of these");
            h.say("first time");
            let outcome = h.say("it is getting worse, severe now");
            assert_eq!(h.state.phase(), ConversationPhase::Guidance);
            assert_eq!(h.state.health_context().severity, Some(Severity::Severe));
            assert!(outcome.assessment.is_some());
            assert!(h
                .state
                .health_context()
                .additional_notes
                .contains("getting worse"));
        }
    }

    mod emergencies {
        use super::*;

        #[test]
        fn red_flag_jumps_straight_to_emergency() {
            let mut h = Harness::new(Some(72));
            let outcome = h.say("Chest pain, it started just now");
            assert_eq!(h.state.phase(), ConversationPhase::Emergency);
            assert_eq!(outcome.emergency.emergency_type, Some(EmergencyType::P1Emergency));
            let result = outcome.assessment.expect("assessment");
            assert_eq!(result.urgency_level, UrgencyLevel::Emergency);
            assert_eq!(outcome.replies[0].content_type(), ContentType::EmergencyAlert);
            assert!(outcome.replies[0].is_emergency());
            assert_eq!(h.state.current_question(), None);
        }

        #[test]
        fn red_flag_mid_conversation_interrupts_questions() {
            let mut h = Harness::new(Some(40));
            h.say("I have a cough");
            let outcome = h.say("now I'm coughing up blood");
            assert_eq!(h.state.phase(), ConversationPhase::Emergency);
            assert!(outcome.asked.is_none());
        }

        #[test]
        fn later_turns_in_emergency_only_repeat_the_reminder() {
            let mut h = Harness::new(None);
            h.say("he fainted");
            let outcome = h.say("what should I do");
            assert_eq!(h.state.phase(), ConversationPhase::Emergency);
            assert!(outcome.asked.is_none());
            assert_eq!(outcome.replies[0].text(), EMERGENCY_REMINDER);
        }
    }

    #[test]
    fn completed_conversation_rejects_turns() {
        let mut h = Harness::new(None);
        h.state.transition_to(ConversationPhase::Completed).unwrap();
        let turn = TurnContext {
            member_id: &h.member,
            profile: None,
            user_transcript: "hello",
            now: Timestamp::now(),
        };
        assert!(h.engine.respond(&mut h.state, "hello", turn).is_err());
    }

    mod random_conversations {
        use super::*;
        use proptest::prelude::*;

        const UTTERANCES: [&str; 14] = [
            "I have a cough",
            "mild headache for 2 days",
            "None of these",
            "first time",
            "it comes and goes",
            "I take metformin",
            "allergic to penicillin",
            "not sure",
            "severe",
            "about a week",
            "fever and a rash",
            "yes",
            "chest pain and trouble breathing",
            "feeling better now",
        ];

        fn asked_and_remaining_partition(state: &ConversationState) -> bool {
            let asked = state.questions_asked();
            let remaining = state.questions_remaining();
            asked.len() + remaining.len() == FollowUpQuestionType::ALL.len()
                && FollowUpQuestionType::ALL
                    .iter()
                    .all(|q| asked.contains(q) != remaining.contains(q))
        }

        proptest! {
            #[test]
            fn every_turn_keeps_questions_partitioned(
                picks in proptest::collection::vec(0usize..UTTERANCES.len(), 1..25),
                age in proptest::option::of(0u32..100),
            ) {
                let mut h = Harness::new(age);
                for pick in picks {
                    h.say(UTTERANCES[pick]);
                    prop_assert!(asked_and_remaining_partition(&h.state));
                    if let Some(question) = h.state.current_question() {
                        prop_assert!(h.state.questions_asked().contains(&question));
                    }
                }
            }
        }
    }
}
