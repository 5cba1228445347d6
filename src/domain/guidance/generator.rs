//! Guidance generator.
//!
//! Turns a triage result and the gathered context into the user-facing
//! guidance sections and a ranked list of suggested actions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::actions::{
    rank_actions, ActionUrgency, PrefilledData, SuggestedAction, SuggestedActionType,
};
use super::copy_style;
use crate::domain::foundation::{MemberId, Timestamp};
use crate::domain::triage::{HealthContext, TriageFactor, TriageLevel, TriageResult, UrgencyLevel};

/// Shown with every guidance response.
pub const DISCLAIMER: &str = "Ask CareBow shares general health information, not a medical \
diagnosis. Always check with a qualified healthcare professional about your health. \
In an emergency, call your local emergency number.";

/// Rendered guidance for one assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    pub understanding: String,
    pub possible_causes: Vec<String>,
    pub immediate_actions: Vec<String>,
    pub when_to_seek_help: Vec<String>,
    pub suggested_actions: Vec<SuggestedAction>,
    pub disclaimer: String,
}

impl GuidanceResponse {
    /// Plain-text rendering used as the guidance message body.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.understanding);
        push_section(&mut out, "Some common reasons this can happen", &self.possible_causes);
        push_section(&mut out, "What you can do now", &self.immediate_actions);
        push_section(&mut out, "When to seek help", &self.when_to_seek_help);
        out.push_str("\n\n");
        out.push_str(&self.disclaimer);
        out
    }

    pub fn has_action(&self, action_type: SuggestedActionType) -> bool {
        self.suggested_actions
            .iter()
            .any(|a| a.action_type == action_type)
    }
}

fn push_section(out: &mut String, heading: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str("\n\n");
    out.push_str(heading);
    out.push(':');
    for line in lines {
        out.push_str("\n- ");
        out.push_str(line);
    }
}

struct CauseCategory {
    keywords: &'static [&'static str],
    causes: &'static [&'static str],
}

const CAUSE_CATEGORIES: &[CauseCategory] = &[
    CauseCategory {
        keywords: &["headache", "migraine", "head hurts"],
        causes: &[
            "Tension, stress or poor sleep can bring on headaches",
            "Not drinking enough water is a frequent trigger",
            "Long screen time or eye strain can play a part",
        ],
    },
    CauseCategory {
        keywords: &["fever", "temperature", "chills"],
        causes: &[
            "A raised temperature is often the body responding to a common infection",
            "Not drinking enough while unwell can make it feel worse",
        ],
    },
    CauseCategory {
        keywords: &["cough", "cold", "sore throat", "runny nose", "congestion"],
        causes: &[
            "Common viral infections such as a cold are a frequent cause",
            "Dry air, smoke or allergies can irritate the throat and airways",
        ],
    },
    CauseCategory {
        keywords: &["stomach", "abdominal", "nausea", "vomit", "diarrhea", "diarrhoea"],
        causes: &[
            "Food that did not agree with the stomach is a frequent cause",
            "A passing stomach bug can cause these symptoms",
            "Indigestion or acidity can be related",
        ],
    },
    CauseCategory {
        keywords: &["back", "joint", "knee", "hip", "shoulder", "neck"],
        causes: &[
            "Muscle strain from lifting or posture is a frequent cause",
            "Joint stiffness can come with reduced activity or age",
        ],
    },
    CauseCategory {
        keywords: &["dizzy", "dizziness", "lightheaded", "light headed"],
        causes: &[
            "Standing up too quickly can cause brief dizziness",
            "Not eating or drinking enough can be related",
            "Some medicines list dizziness as a side effect",
        ],
    },
    CauseCategory {
        keywords: &["tired", "fatigue", "weak", "exhausted"],
        causes: &[
            "Poor or interrupted sleep is a frequent cause of tiredness",
            "Stress or low mood can leave people feeling drained",
            "Irregular meals can affect energy levels",
        ],
    },
    CauseCategory {
        keywords: &["rash", "itch", "skin", "hives"],
        causes: &[
            "Contact with an irritant or allergen can affect the skin",
            "Dry skin can itch, especially in colder weather",
        ],
    },
];

const GENERAL_CAUSE: &str =
    "Everyday factors such as rest, hydration and stress can affect how we feel";

/// Stateless renderer from triage output to guidance.
#[derive(Debug, Clone, Default)]
pub struct GuidanceGenerator;

impl GuidanceGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        result: &TriageResult,
        context: &HealthContext,
        member_id: &MemberId,
        now: Timestamp,
    ) -> GuidanceResponse {
        GuidanceResponse {
            understanding: understanding(result, context),
            possible_causes: possible_causes(result, context),
            immediate_actions: immediate_actions(result, context),
            when_to_seek_help: when_to_seek_help(result),
            suggested_actions: suggested_actions(result, context, member_id, now),
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

fn understanding(result: &TriageResult, context: &HealthContext) -> String {
    if result.is_emergency() {
        return "Some of what you described can be a sign of a medical emergency. \
Please get emergency help right away."
            .to_string();
    }
    let symptom = if context.has_primary_symptom() {
        context.primary_symptom.trim().to_lowercase()
    } else {
        "how you are feeling".to_string()
    };
    let mut details = Vec::new();
    if let Some(duration) = context.duration {
        details.push(format!("for {}", duration.label().to_lowercase()));
    }
    if let Some(severity) = context.severity {
        details.push(format!("rated {}", severity.short_label().to_lowercase()));
    }
    if !context.associated_symptoms.is_empty() {
        details.push(format!(
            "along with {}",
            context.associated_symptoms.join(", ")
        ));
    }
    let mut text = format!("Thanks for sharing. You mentioned {}", symptom);
    if !details.is_empty() {
        text.push_str(", ");
        text.push_str(&details.join(", "));
    }
    text.push_str(&format!(
        ". Based on what you told me, the suggested next step is: {}.",
        result.display().label.to_lowercase()
    ));
    text
}

fn possible_causes(result: &TriageResult, context: &HealthContext) -> Vec<String> {
    if result.is_emergency() {
        return Vec::new();
    }
    let mut haystack = context.primary_symptom.to_lowercase();
    for symptom in &context.associated_symptoms {
        haystack.push(' ');
        haystack.push_str(&symptom.to_lowercase());
    }

    let mut causes: Vec<String> = Vec::new();
    for category in CAUSE_CATEGORIES {
        if category.keywords.iter().any(|k| haystack.contains(k)) {
            for cause in category.causes {
                if !causes.iter().any(|c| c == cause) {
                    causes.push((*cause).to_string());
                }
            }
        }
    }
    if causes.is_empty() {
        causes.push(GENERAL_CAUSE.to_string());
    }
    causes.push("Only a healthcare professional can say what is behind your symptoms".to_string());

    causes
        .into_iter()
        .filter(|line| {
            let ok = copy_style::is_compliant(line);
            if !ok {
                debug!(line = %line, "dropping cause line that reads as a diagnosis");
            }
            ok
        })
        .collect()
}

fn immediate_actions(result: &TriageResult, context: &HealthContext) -> Vec<String> {
    let mut actions: Vec<String> = match result.level {
        TriageLevel::Emergency => vec![
            "Call your local emergency number now".into(),
            "Stay with the person and keep them calm and still".into(),
            "Do not give food, drink or new medicine until help arrives".into(),
            "Unlock the door and keep your phone close by".into(),
        ],
        TriageLevel::Urgent => vec![
            "Arrange to speak with a doctor today".into(),
            "Rest and avoid strenuous activity".into(),
            "Write down symptoms and current medicines to share with the doctor".into(),
        ],
        TriageLevel::Consult => vec![
            "Book an appointment with a doctor".into(),
            "Note when the symptoms feel better or worse".into(),
            "Rest and drink plenty of fluids".into(),
        ],
        TriageLevel::Monitor => vec![
            "Rest and drink plenty of fluids".into(),
            "Keep track of the symptoms each day".into(),
            "Check back in if anything changes".into(),
        ],
        TriageLevel::SelfCare => vec![
            "Rest and drink plenty of fluids".into(),
            "Use comfort measures that have helped before".into(),
            "Check back in if things do not improve".into(),
        ],
    };
    if !context.allergies.is_empty() && !result.is_emergency() {
        actions.push(format!(
            "Avoid anything containing known allergens: {}",
            context.allergies.join(", ")
        ));
    }
    actions
}

fn when_to_seek_help(result: &TriageResult) -> Vec<String> {
    let mut lines = vec![
        "Call emergency services for chest pain, trouble breathing, fainting or sudden confusion"
            .to_string(),
    ];
    match result.urgency_level {
        UrgencyLevel::Emergency => {}
        UrgencyLevel::Urgent | UrgencyLevel::SeeDoctorSoon => {
            lines.push("Get medical help sooner if symptoms get worse quickly".into());
        }
        UrgencyLevel::ScheduleVisit => {
            lines.push("Get medical help sooner if symptoms get worse".into());
            lines.push("See a doctor if there is no improvement within a few days".into());
        }
        UrgencyLevel::Monitor | UrgencyLevel::SelfCare => {
            lines.push("See a doctor if symptoms last more than a few days".into());
            lines.push("See a doctor if new symptoms appear".into());
        }
    }
    lines.push(format!(
        "Recommended timeframe: {}",
        result.recommended_timeframe
    ));
    lines
}

fn suggested_actions(
    result: &TriageResult,
    context: &HealthContext,
    member_id: &MemberId,
    now: Timestamp,
) -> Vec<SuggestedAction> {
    use ActionUrgency as U;
    use SuggestedActionType as T;

    let prefill = |action_type: T, days_ahead: Option<i64>| PrefilledData {
        member_id: member_id.clone(),
        service: action_type.service_name().map(str::to_string),
        suggested_date: days_ahead.map(|d| now.add_days(d).date_label()),
        duration: action_type.default_duration().map(str::to_string),
        notes: booking_notes(result, context),
    };
    let bookable = |action_type: T, description: &str, urgency: U, days_ahead: Option<i64>| {
        SuggestedAction::new(action_type, description, urgency)
            .with_prefilled(prefill(action_type, days_ahead))
    };

    let mut actions = match result.urgency_level {
        UrgencyLevel::Emergency => vec![
            SuggestedAction::new(
                T::CallEmergency,
                "Call your local emergency number right away",
                U::Immediate,
            ),
            bookable(
                T::BookDoctor,
                "Arrange a follow-up doctor visit after emergency care",
                U::Soon,
                None,
            ),
        ],
        UrgencyLevel::Urgent => vec![
            bookable(T::VideoConsult, "Speak with a doctor by video today", U::High, Some(0)),
            bookable(T::BookDoctor, "Book a doctor home visit today", U::High, Some(0)),
        ],
        UrgencyLevel::SeeDoctorSoon => vec![
            bookable(T::BookDoctor, "Book a doctor visit in the next day or two", U::Soon, Some(1)),
            bookable(T::VideoConsult, "Talk to a doctor by video", U::Soon, Some(0)),
        ],
        UrgencyLevel::ScheduleVisit => vec![
            bookable(T::BookDoctor, "Schedule a routine doctor visit", U::Routine, Some(5)),
            SuggestedAction::new(T::MonitorAtHome, "Keep an eye on symptoms at home", U::Low),
        ],
        UrgencyLevel::Monitor => vec![
            SuggestedAction::new(T::MonitorAtHome, "Keep an eye on symptoms at home", U::Low),
            bookable(
                T::VideoConsult,
                "Talk to a doctor by video if things are not improving",
                U::Low,
                Some(2),
            ),
        ],
        UrgencyLevel::SelfCare => vec![
            SuggestedAction::new(T::MonitorAtHome, "Rest and look after yourself at home", U::Low),
            SuggestedAction::new(T::NoActionNeeded, "No booking needed right now", U::Low),
        ],
    };

    if !result.is_emergency() {
        let follow_up = if result.urgency_level >= UrgencyLevel::ScheduleVisit {
            U::Soon
        } else {
            U::Routine
        };
        for factor in &result.factors {
            match factor {
                TriageFactor::Age { .. } => actions.push(bookable(
                    T::RequestNurse,
                    "A nurse can visit to check vital signs at home",
                    follow_up,
                    Some(1),
                )),
                TriageFactor::PersistingDuration
                | TriageFactor::RecurringSymptom
                | TriageFactor::HighRiskCondition { .. } => actions.push(bookable(
                    T::BookLabTest,
                    "Routine lab tests at home can help your doctor",
                    U::Routine,
                    Some(2),
                )),
                TriageFactor::UrgentIndicator { indicator }
                    if indicator == "fall" || indicator == "fell" =>
                {
                    actions.push(bookable(
                        T::RentEquipment,
                        "Mobility aids such as a walker can help prevent another fall",
                        U::Routine,
                        Some(0),
                    ))
                }
                _ => {}
            }
        }
    }

    rank_actions(actions)
}

fn booking_notes(result: &TriageResult, context: &HealthContext) -> String {
    let mut parts = Vec::new();
    if context.has_primary_symptom() {
        parts.push(format!("Reported: {}", context.primary_symptom.trim()));
    }
    if let Some(duration) = context.duration {
        parts.push(format!("Duration: {}", duration.label()));
    }
    if let Some(severity) = context.severity {
        parts.push(format!("Severity: {}", severity.label()));
    }
    parts.push(format!("Urgency: {}", result.display().label));
    parts.join("; ")
}
