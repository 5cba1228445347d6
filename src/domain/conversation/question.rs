//! Follow-up questions asked while gathering context.

use serde::{Deserialize, Serialize};

use crate::domain::triage::{Frequency, HealthContext, Severity, SymptomDuration};

/// Fixed set of follow-up questions, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpQuestionType {
    Duration,
    Severity,
    AssociatedSymptoms,
    Frequency,
    Medications,
    MedicalHistory,
    RecentEvents,
}

impl FollowUpQuestionType {
    pub const ALL: [FollowUpQuestionType; 7] = [
        Self::Duration,
        Self::Severity,
        Self::AssociatedSymptoms,
        Self::Frequency,
        Self::Medications,
        Self::MedicalHistory,
        Self::RecentEvents,
    ];

    /// Text of the question as shown to the user.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Duration => "How long has this been going on?",
            Self::Severity => "How bad is it right now?",
            Self::AssociatedSymptoms => "Are there any other symptoms along with it?",
            Self::Frequency => "Has this happened before, or is it new?",
            Self::Medications => "Are any medicines being taken regularly? Please list them.",
            Self::MedicalHistory => {
                "Are there any ongoing health conditions, like diabetes or heart problems?"
            }
            Self::RecentEvents => {
                "Has anything happened recently, such as a fall, travel or an illness?"
            }
        }
    }

    /// Human-readable name, used for unanswered questions in exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Duration => "Symptom duration",
            Self::Severity => "Symptom severity",
            Self::AssociatedSymptoms => "Other symptoms",
            Self::Frequency => "How often it happens",
            Self::Medications => "Current medications",
            Self::MedicalHistory => "Medical history",
            Self::RecentEvents => "Recent events",
        }
    }

    /// Tappable answers offered with the question.
    pub fn quick_options(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            Self::Duration => {
                return SymptomDuration::ALL
                    .iter()
                    .map(|d| d.label().to_string())
                    .collect()
            }
            Self::Severity => {
                return Severity::ALL
                    .iter()
                    .map(|s| s.label().to_string())
                    .collect()
            }
            Self::Frequency => {
                return Frequency::ALL
                    .iter()
                    .map(|f| f.label().to_string())
                    .collect()
            }
            Self::AssociatedSymptoms => &["Fever", "Nausea", "Dizziness", "Tiredness", "None of these"],
            Self::Medications => &["No regular medicines", "Not sure"],
            Self::MedicalHistory => &["Diabetes", "High blood pressure", "Heart condition", "None"],
            Self::RecentEvents => &["A recent fall", "Recent travel", "A recent illness", "Nothing unusual"],
        };
        fixed.iter().map(|s| s.to_string()).collect()
    }

    /// True if the context already holds an answer to this question.
    pub fn is_answered_by(&self, context: &HealthContext) -> bool {
        match self {
            Self::Duration => context.duration.is_some(),
            Self::Severity => context.severity.is_some(),
            Self::AssociatedSymptoms => !context.associated_symptoms.is_empty(),
            Self::Frequency => context.frequency.is_some(),
            Self::Medications => !context.medications.is_empty(),
            Self::MedicalHistory => !context.chronic_conditions.is_empty(),
            Self::RecentEvents => !context.recent_events.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_question_has_prompt_label_and_options() {
        for question in FollowUpQuestionType::ALL {
            assert!(question.prompt().ends_with('?') || question.prompt().ends_with('.'));
            assert!(!question.label().is_empty());
            assert!(!question.quick_options().is_empty());
        }
    }

    #[test]
    fn duration_options_come_from_the_label_table() {
        let options = FollowUpQuestionType::Duration.quick_options();
        assert_eq!(options.len(), SymptomDuration::ALL.len());
        assert_eq!(options[0], SymptomDuration::JustNow.label());
    }

    #[test]
    fn answered_questions_follow_the_context() {
        let mut ctx = HealthContext::new();
        assert!(!FollowUpQuestionType::Medications.is_answered_by(&ctx));
        ctx.medications.push("metformin".into());
        assert!(FollowUpQuestionType::Medications.is_answered_by(&ctx));
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&FollowUpQuestionType::MedicalHistory).unwrap();
        assert_eq!(json, "\"medical_history\"");
    }
}
