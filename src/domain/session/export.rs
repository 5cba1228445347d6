//! Clinical handoff exports.
//!
//! Two renderings of the same summary: a plain-text note for pasting into a
//! chart, and a versioned JSON envelope for machine consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::aggregate::AskCarebowSession;
use super::summary::{generate_session_summary, SessionSummary};
use crate::domain::conversation::{ContentType, Role};
use crate::domain::feedback::FeedbackEntry;
use crate::domain::foundation::{MemberId, SessionId, Timestamp, UserId};
use crate::domain::guidance::DISCLAIMER;

/// Version stamped on every JSON envelope.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Text,
    Json,
}

/// Audit record of one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub format: ExportFormat,
    pub exported_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHeader {
    pub id: SessionId,
    pub user_id: UserId,
    pub member_id: MemberId,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub is_active: bool,
    pub triggered_emergency_flow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub role: Role,
    pub content_type: ContentType,
    pub text: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedActions {
    pub order_id: Option<String>,
    pub request_id: Option<String>,
}

/// JSON export envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub exported_at: Timestamp,
    pub version: String,
    pub session: SessionHeader,
    pub summary: SessionSummary,
    pub conversation_log: Vec<LogEntry>,
    pub feedback: Vec<FeedbackEntry>,
    pub linked_actions: LinkedActions,
}

/// Frozen summary for ended sessions, a fresh projection otherwise.
fn summary_of(session: &AskCarebowSession) -> SessionSummary {
    session
        .session_summary()
        .cloned()
        .unwrap_or_else(|| generate_session_summary(session))
}

pub fn build_export(session: &AskCarebowSession, now: Timestamp) -> SessionExport {
    SessionExport {
        exported_at: now,
        version: EXPORT_VERSION.to_string(),
        session: SessionHeader {
            id: *session.id(),
            user_id: session.user_id().clone(),
            member_id: session.member_id().clone(),
            started_at: *session.started_at(),
            ended_at: session.ended_at().copied(),
            is_active: session.is_active(),
            triggered_emergency_flow: session.triggered_emergency_flow(),
        },
        summary: summary_of(session),
        conversation_log: session
            .messages()
            .iter()
            .map(|m| LogEntry {
                role: m.role(),
                content_type: m.content_type(),
                text: m.text().to_string(),
                timestamp: *m.timestamp(),
            })
            .collect(),
        feedback: session.feedback().to_vec(),
        linked_actions: LinkedActions {
            order_id: session.linked_order_id().map(str::to_string),
            request_id: session.linked_request_id().map(str::to_string),
        },
    }
}

/// Pretty-printed JSON envelope.
///
/// # Errors
///
/// Returns the serializer error; none of the envelope's types can fail in
/// practice.
pub fn export_json(session: &AskCarebowSession, now: Timestamp) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&build_export(session, now))
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None reported".to_string()
    } else {
        items.join(", ")
    }
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    writeln!(f, "{}", "-".repeat(title.len()))
}

/// Plain-text clinical note.
pub fn export_text(session: &AskCarebowSession, now: Timestamp) -> String {
    TextNote {
        summary: summary_of(session),
        now,
    }
    .to_string()
}

struct TextNote {
    summary: SessionSummary,
    now: Timestamp,
}

impl fmt::Display for TextNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        writeln!(f, "ASK CAREBOW SESSION NOTE")?;
        writeln!(f, "Session: {}", summary.session_id)?;
        writeln!(f, "Started: {}", summary.started_at.display_label())?;
        if let Some(ended) = &summary.ended_at {
            writeln!(f, "Ended: {}", ended.display_label())?;
        }
        writeln!(f, "Exported: {}", self.now.display_label())?;

        heading(f, "PATIENT INFORMATION")?;
        let patient = &summary.patient;
        let name = patient.display_name.as_deref().unwrap_or(patient.member_id.as_str());
        writeln!(f, "Member: {name}")?;
        match patient.age {
            Some(age) => writeln!(f, "Age: {age}")?,
            None => writeln!(f, "Age: Not provided")?,
        }
        if let Some(relationship) = patient.relationship {
            writeln!(f, "Relationship: {}", relationship.label())?;
        }
        writeln!(f, "Known conditions: {}", list_or_none(&patient.known_conditions))?;
        writeln!(f, "Medications: {}", list_or_none(&patient.medications))?;
        writeln!(f, "Allergies: {}", list_or_none(&patient.allergies))?;

        heading(f, "CHIEF COMPLAINT")?;
        writeln!(f, "{}", summary.chief_complaint)?;

        heading(f, "COLLECTED DATA")?;
        let data = &summary.collected_data;
        let unknown = "Not provided";
        writeln!(f, "Primary symptom: {}", data.primary_symptom.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Duration: {}", data.duration.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Severity: {}", data.severity.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Frequency: {}", data.frequency.as_deref().unwrap_or(unknown))?;
        writeln!(f, "Associated symptoms: {}", list_or_none(&data.associated_symptoms))?;
        writeln!(f, "Chronic conditions: {}", list_or_none(&data.chronic_conditions))?;
        writeln!(f, "Medications: {}", list_or_none(&data.medications))?;
        writeln!(f, "Allergies: {}", list_or_none(&data.allergies))?;
        writeln!(f, "Recent events: {}", list_or_none(&data.recent_events))?;
        if let Some(notes) = &data.additional_notes {
            writeln!(f, "Notes: {notes}")?;
        }

        heading(f, "AI TRIAGE ASSESSMENT")?;
        match &summary.triage_outcome {
            Some(outcome) => {
                writeln!(f, "Urgency: {}", outcome.urgency_label)?;
                writeln!(f, "Risk level: {}", outcome.level.label())?;
                writeln!(f, "Confidence: {}", outcome.confidence)?;
                writeln!(f, "Timeframe: {}", outcome.recommended_timeframe)?;
                if !outcome.red_flags_detected.is_empty() {
                    writeln!(f, "Red flags: {}", outcome.red_flags_detected.join(", "))?;
                }
                for reason in &outcome.reasoning {
                    writeln!(f, "- {reason}")?;
                }
            }
            None => writeln!(f, "No assessment was completed.")?,
        }
        let safety = if summary.safety_check_passed {
            "Passed"
        } else {
            "Emergency flow triggered"
        };
        writeln!(f, "Safety check: {safety}")?;

        heading(f, "ACTIONS RECOMMENDED")?;
        if summary.actions_recommended.is_empty() {
            writeln!(f, "None")?;
        }
        for action in &summary.actions_recommended {
            writeln!(f, "- {action}")?;
        }

        heading(f, "DATA COMPLETENESS")?;
        writeln!(f, "{}", summary.data_completeness)?;
        if !summary.unanswered_questions.is_empty() {
            writeln!(f, "Not covered: {}", summary.unanswered_questions.join(", "))?;
        }

        heading(f, "DISCLAIMER")?;
        writeln!(f, "{DISCLAIMER}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationEngine;
    use crate::domain::triage::{HealthContext, MemberProfile};

    fn finished_session() -> AskCarebowSession {
        let member = MemberId::new("mum").unwrap();
        let mut s = AskCarebowSession::start(
            UserId::new("caregiver").unwrap(),
            member.clone(),
            Some(MemberProfile::new(member).with_age(30)),
            HealthContext::new(),
            Timestamp::now(),
        );
        let engine = ConversationEngine::default();
        for text in ["mild headache for 2 days", "None of these", "first time"] {
            s.receive_user_message(&engine, text, Timestamp::now()).unwrap();
        }
        s.end(Timestamp::now()).unwrap();
        s
    }

    #[test]
    fn text_sections_appear_in_order() {
        let text = export_text(&finished_session(), Timestamp::now());
        let sections = [
            "PATIENT INFORMATION",
            "CHIEF COMPLAINT",
            "COLLECTED DATA",
            "AI TRIAGE ASSESSMENT",
            "ACTIONS RECOMMENDED",
            "DATA COMPLETENESS",
            "DISCLAIMER",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|s| text.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("mild headache for 2 days"));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn text_without_assessment_says_so() {
        let member = MemberId::new("m").unwrap();
        let s = AskCarebowSession::start(
            UserId::new("u").unwrap(),
            member,
            None,
            HealthContext::new(),
            Timestamp::now(),
        );
        let text = export_text(&s, Timestamp::now());
        assert!(text.contains("No assessment was completed."));
        assert!(text.contains("Age: Not provided"));
    }

    #[test]
    fn text_headings_are_underlined_and_note_ends_with_disclaimer() {
        let text = export_text(&finished_session(), Timestamp::now());
        assert!(text.starts_with("ASK CAREBOW SESSION NOTE\n"));
        assert!(text.contains("\nCHIEF COMPLAINT\n---------------\n"));
        assert!(text.contains("Member: mum\n"));
        assert!(text.contains("Age: 30\n"));
        assert!(text.ends_with(&format!("{DISCLAIMER}\n")));
    }

    #[test]
    fn json_round_trips_key_fields() {
        let session = finished_session();
        let json = export_json(&session, Timestamp::now()).unwrap();
        let parsed: SessionExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, EXPORT_VERSION);
        assert_eq!(parsed.summary.chief_complaint, "mild headache for 2 days");
        assert_eq!(
            parsed.summary.triage_outcome.map(|o| o.urgency_level),
            session.urgency_level()
        );
        assert_eq!(parsed.conversation_log.len(), session.messages().len());
    }

    #[test]
    fn json_uses_camel_case_envelope_keys() {
        let value: serde_json::Value =
            serde_json::from_str(&export_json(&finished_session(), Timestamp::now()).unwrap())
                .unwrap();
        for key in [
            "exportedAt",
            "version",
            "session",
            "summary",
            "conversationLog",
            "feedback",
            "linkedActions",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
