//! Session summary projection.

use serde::{Deserialize, Serialize};

use super::aggregate::AskCarebowSession;
use crate::domain::foundation::{MemberId, Percentage, SessionId, Timestamp};
use crate::domain::triage::{Relationship, TriageLevel, UrgencyLevel};

/// Chief complaint when nothing was said.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Scored context fields, used for the completeness percentage.
const SCORED_FIELDS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub member_id: MemberId,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    pub relationship: Option<Relationship>,
    pub known_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedData {
    pub primary_symptom: Option<String>,
    pub duration: Option<String>,
    pub severity: Option<String>,
    pub frequency: Option<String>,
    pub associated_symptoms: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub recent_events: Vec<String>,
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageOutcome {
    pub level: TriageLevel,
    pub urgency_level: UrgencyLevel,
    pub urgency_label: String,
    pub confidence: Percentage,
    pub recommended_timeframe: String,
    pub reasoning: Vec<String>,
    pub red_flags_detected: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Frozen, human-readable view of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub patient: PatientInfo,
    pub chief_complaint: String,
    pub collected_data: CollectedData,
    pub triage_outcome: Option<TriageOutcome>,
    pub actions_recommended: Vec<String>,
    pub services_recommended: Vec<String>,
    pub unanswered_questions: Vec<String>,
    pub safety_check_passed: bool,
    pub data_completeness: Percentage,
    pub message_count: usize,
}

/// Projects a session into its summary.
///
/// Pure: reads only the session, so repeated calls on an unchanged session
/// produce identical output.
pub fn generate_session_summary(session: &AskCarebowSession) -> SessionSummary {
    let ctx = session.health_context();
    let profile = session.profile();

    let chief_complaint = session
        .first_user_message()
        .map(|m| m.text().to_string())
        .or_else(|| ctx.has_primary_symptom().then(|| ctx.primary_symptom.clone()))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let patient = PatientInfo {
        member_id: session.member_id().clone(),
        display_name: profile.and_then(|p| p.display_name.clone()),
        age: profile.and_then(|p| p.age),
        relationship: profile.map(|p| p.relationship),
        known_conditions: profile.map(|p| p.known_conditions.clone()).unwrap_or_default(),
        medications: profile.map(|p| p.medications.clone()).unwrap_or_default(),
        allergies: profile.map(|p| p.allergies.clone()).unwrap_or_default(),
    };

    let collected_data = CollectedData {
        primary_symptom: ctx
            .has_primary_symptom()
            .then(|| ctx.primary_symptom.clone()),
        duration: ctx.duration.map(|d| d.label().to_string()),
        severity: ctx.severity.map(|s| s.label().to_string()),
        frequency: ctx.frequency.map(|f| f.label().to_string()),
        associated_symptoms: ctx.associated_symptoms.clone(),
        chronic_conditions: ctx.chronic_conditions.clone(),
        medications: ctx.medications.clone(),
        allergies: ctx.allergies.clone(),
        recent_events: ctx.recent_events.clone(),
        additional_notes: (!ctx.additional_notes.is_empty())
            .then(|| ctx.additional_notes.clone()),
    };

    let triage_outcome = session.last_assessment().map(|r| TriageOutcome {
        level: r.level,
        urgency_level: r.urgency_level,
        urgency_label: r.display().label.to_string(),
        confidence: r.confidence,
        recommended_timeframe: r.recommended_timeframe.clone(),
        reasoning: r.reasoning.clone(),
        red_flags_detected: r.red_flags_detected.clone(),
        risk_factors: r.risk_factors.clone(),
    });

    SessionSummary {
        session_id: *session.id(),
        started_at: *session.started_at(),
        ended_at: session.ended_at().copied(),
        patient,
        chief_complaint,
        collected_data,
        triage_outcome,
        actions_recommended: session
            .suggested_actions()
            .iter()
            .map(|a| format!("{}: {}", a.label, a.description))
            .collect(),
        services_recommended: session.recommended_services().to_vec(),
        unanswered_questions: session
            .conversation_state()
            .questions_remaining()
            .iter()
            .map(|q| q.label().to_string())
            .collect(),
        safety_check_passed: !session.triggered_emergency_flow(),
        data_completeness: Percentage::of(ctx.populated_field_count(), SCORED_FIELDS),
        message_count: session.messages().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationEngine;
    use crate::domain::foundation::UserId;
    use crate::domain::triage::{HealthContext, HealthContextUpdate, MemberProfile};

    fn session() -> AskCarebowSession {
        let member = MemberId::new("gran").unwrap();
        AskCarebowSession::start(
            UserId::new("u").unwrap(),
            member.clone(),
            Some(MemberProfile::new(member).with_age(81)),
            HealthContext::new(),
            Timestamp::now(),
        )
    }

    #[test]
    fn empty_session_reports_not_specified() {
        let summary = generate_session_summary(&session());
        assert_eq!(summary.chief_complaint, NOT_SPECIFIED);
        assert_eq!(summary.unanswered_questions.len(), 7);
        assert!(summary.safety_check_passed);
        assert_eq!(summary.data_completeness, Percentage::ZERO);
        assert!(summary.triage_outcome.is_none());
    }

    #[test]
    fn falls_back_to_primary_symptom_without_user_messages() {
        let mut s = session();
        let update = HealthContextUpdate {
            primary_symptom: Some("back pain".into()),
            ..HealthContextUpdate::default()
        };
        s.update_health_context(update, Timestamp::now()).unwrap();
        assert_eq!(generate_session_summary(&s).chief_complaint, "back pain");
    }

    #[test]
    fn chief_complaint_is_first_user_message() {
        let mut s = session();
        let engine = ConversationEngine::default();
        s.receive_user_message(&engine, "My knee hurts when I walk", Timestamp::now())
            .unwrap();
        s.receive_user_message(&engine, "about a week", Timestamp::now())
            .unwrap();
        let summary = generate_session_summary(&s);
        assert_eq!(summary.chief_complaint, "My knee hurts when I walk");
        assert_eq!(summary.collected_data.duration.as_deref(), Some("About a week"));
        assert!(!summary.unanswered_questions.contains(&"Symptom duration".to_string()));
    }

    #[test]
    fn emergency_fails_safety_check() {
        let mut s = session();
        s.receive_user_message(&ConversationEngine::default(), "he had a seizure", Timestamp::now())
            .unwrap();
        let summary = generate_session_summary(&s);
        assert!(!summary.safety_check_passed);
        assert_eq!(
            summary.triage_outcome.unwrap().urgency_level,
            UrgencyLevel::Emergency
        );
    }

    #[test]
    fn summary_is_idempotent() {
        let mut s = session();
        s.receive_user_message(&ConversationEngine::default(), "cough for 3 days", Timestamp::now())
            .unwrap();
        let a = serde_json::to_string(&generate_session_summary(&s)).unwrap();
        let b = serde_json::to_string(&generate_session_summary(&s)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(generate_session_summary(&session())).unwrap();
        assert!(json.get("chiefComplaint").is_some());
        assert!(json.get("safetyCheckPassed").is_some());
        assert!(json.get("unansweredQuestions").is_some());
    }
}
