//! Keyword extraction from user text.
//!
//! Pulls structured health data out of free text with fixed keyword and
//! pattern tables. No language understanding beyond that.

use once_cell::sync::Lazy;
use regex::Regex;

use super::question::FollowUpQuestionType;
use crate::domain::triage::{Frequency, HealthContext, HealthContextUpdate, Severity, SymptomDuration};

/// Longest primary symptom kept when no known keyword matches.
pub const MAX_SYMPTOM_LENGTH: usize = 120;

/// Known symptom keywords and the name they are recorded under.
const KNOWN_SYMPTOMS: &[(&str, &str)] = &[
    ("chest pain", "chest pain"),
    ("headache", "headache"),
    ("migraine", "headache"),
    ("fever", "fever"),
    ("temperature", "fever"),
    ("sore throat", "sore throat"),
    ("cough", "cough"),
    ("runny nose", "runny nose"),
    ("stomach ache", "stomach pain"),
    ("stomach pain", "stomach pain"),
    ("abdominal pain", "stomach pain"),
    ("nausea", "nausea"),
    ("nauseous", "nausea"),
    ("vomiting", "vomiting"),
    ("diarrhea", "diarrhea"),
    ("diarrhoea", "diarrhea"),
    ("back pain", "back pain"),
    ("joint pain", "joint pain"),
    ("knee pain", "knee pain"),
    ("dizziness", "dizziness"),
    ("dizzy", "dizziness"),
    ("lightheaded", "dizziness"),
    ("tiredness", "tiredness"),
    ("tired", "tiredness"),
    ("fatigue", "tiredness"),
    ("weakness", "weakness"),
    ("rash", "rash"),
    ("itching", "itching"),
    ("swelling", "swelling"),
    ("shortness of breath", "shortness of breath"),
    ("breathless", "shortness of breath"),
    ("confusion", "confusion"),
    ("insomnia", "trouble sleeping"),
    ("can't sleep", "trouble sleeping"),
];

/// Answers that mean "nothing to add".
const NEGATIVE_ANSWERS: &[&str] = &[
    "no",
    "nope",
    "none",
    "nothing",
    "none of these",
    "no regular medicines",
    "nothing unusual",
    "not sure",
    "n/a",
];

static DURATION_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?|one|two|three|four|five|six|seven|a few|few|a couple of|couple of|several)\s+(minute|hour|day|week|month|year)s?\b",
    )
    .expect("duration pattern is a valid regex")
});

static PAIN_SCALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(10|[0-9])\s*(?:/|out of)\s*10\b").expect("pain scale pattern is a valid regex")
});

static ALLERGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\ballergic to ([a-z][a-z ,\-]*)").expect("allergy pattern is a valid regex")
});

static LIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:,|;|/|\band\b|\bplus\b)\s*").expect("list separator pattern is a valid regex")
});

/// Turns one utterance into a context update.
#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts what `text` says, given the question it answers (if any).
    ///
    /// The first utterance of a session sets the primary symptom. Answers to
    /// list questions are split on commas and "and". Text that yields nothing
    /// structured is kept as a note.
    pub fn extract(
        &self,
        text: &str,
        answering: Option<FollowUpQuestionType>,
        context: &HealthContext,
    ) -> HealthContextUpdate {
        let text = text.trim();
        let lower = text.to_lowercase();
        let mut update = HealthContextUpdate::default();

        let symptoms = find_symptoms(&lower);
        if !context.has_primary_symptom() {
            update.primary_symptom = Some(match symptoms.first() {
                Some(first) => (*first).to_string(),
                None => truncate(text, MAX_SYMPTOM_LENGTH),
            });
        }
        let primary = update
            .primary_symptom
            .clone()
            .unwrap_or_else(|| context.primary_symptom.to_lowercase());
        for symptom in &symptoms {
            if !primary.contains(symptom) {
                update.associated_symptoms.push((*symptom).to_string());
            }
        }

        update.duration = parse_duration(&lower);
        update.severity = parse_severity(&lower);
        update.frequency = parse_frequency(&lower);
        update.allergies = parse_allergies(&lower);

        match answering {
            Some(FollowUpQuestionType::AssociatedSymptoms) => {
                for item in split_list(text) {
                    if !primary.contains(&item.to_lowercase()) {
                        update.associated_symptoms.push(item);
                    }
                }
            }
            Some(FollowUpQuestionType::Medications) => update.medications = split_list(text),
            Some(FollowUpQuestionType::MedicalHistory) => {
                update.chronic_conditions = split_list(text)
            }
            Some(FollowUpQuestionType::RecentEvents) => update.recent_events = split_list(text),
            Some(FollowUpQuestionType::Duration) if update.duration.is_none() => {
                update.note = Some(format!("Duration: {}", text));
            }
            Some(FollowUpQuestionType::Severity) if update.severity.is_none() => {
                update.note = Some(format!("Severity: {}", text));
            }
            Some(FollowUpQuestionType::Frequency) if update.frequency.is_none() => {
                update.note = Some(format!("Frequency: {}", text));
            }
            _ => {}
        }

        if answering.is_none() && context.has_primary_symptom() {
            update.note = Some(text.to_string());
        }
        update
    }
}

/// Known symptoms in order of first appearance, deduplicated.
fn find_symptoms(lower: &str) -> Vec<&'static str> {
    let mut hits: Vec<(usize, &'static str)> = KNOWN_SYMPTOMS
        .iter()
        .filter_map(|(keyword, name)| lower.find(keyword).map(|pos| (pos, *name)))
        .collect();
    hits.sort_by_key(|(pos, _)| *pos);
    let mut names: Vec<&'static str> = Vec::new();
    for (_, name) in hits {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn truncate(text: &str, max: usize) -> String {
    text.trim_end_matches(|c: char| c == '.' || c == '!' || c == '?')
        .chars()
        .take(max)
        .collect()
}

fn word_amount(word: &str) -> u32 {
    match word {
        "a" | "an" | "one" => 1,
        "two" | "a couple of" | "couple of" => 2,
        "three" | "a few" | "few" => 3,
        "four" | "several" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        digits => digits.parse().unwrap_or(1),
    }
}

/// Reads a duration from phrases like "2 days", "a few hours" or "since yesterday".
pub fn parse_duration(lower: &str) -> Option<SymptomDuration> {
    if let Some(duration) = SymptomDuration::ALL
        .iter()
        .find(|d| lower == d.label().to_lowercase())
    {
        return Some(*duration);
    }
    if let Some(caps) = DURATION_AMOUNT.captures(lower) {
        let amount = word_amount(&caps[1].to_lowercase());
        return Some(match &caps[2] {
            "minute" => SymptomDuration::JustNow,
            "hour" if amount < 24 => SymptomDuration::FewHours,
            "hour" => SymptomDuration::OneDay,
            "day" => match amount {
                0 | 1 => SymptomDuration::OneDay,
                2..=6 => SymptomDuration::FewDays,
                7 => SymptomDuration::OneWeek,
                _ => SymptomDuration::MoreThanWeek,
            },
            "week" if amount <= 1 => SymptomDuration::OneWeek,
            "week" => SymptomDuration::MoreThanWeek,
            "month" if amount < 3 => SymptomDuration::MoreThanWeek,
            _ => SymptomDuration::Chronic,
        });
    }
    const CUES: &[(&str, SymptomDuration)] = &[
        ("just now", SymptomDuration::JustNow),
        ("just started", SymptomDuration::JustNow),
        ("suddenly", SymptomDuration::JustNow),
        ("all of a sudden", SymptomDuration::JustNow),
        ("this morning", SymptomDuration::FewHours),
        ("since morning", SymptomDuration::FewHours),
        ("tonight", SymptomDuration::FewHours),
        ("today", SymptomDuration::FewHours),
        ("yesterday", SymptomDuration::OneDay),
        ("last night", SymptomDuration::OneDay),
        ("for ages", SymptomDuration::Chronic),
        ("long time", SymptomDuration::Chronic),
        ("chronic", SymptomDuration::Chronic),
    ];
    CUES.iter()
        .find(|(cue, _)| lower.contains(cue))
        .map(|(_, duration)| *duration)
}

/// Reads a severity from words like "mild" or "terrible", or a 0-10 scale.
pub fn parse_severity(lower: &str) -> Option<Severity> {
    if let Some(caps) = PAIN_SCALE.captures(lower) {
        let score: u32 = caps[1].parse().unwrap_or(0);
        return Some(match score {
            0..=3 => Severity::Mild,
            4..=6 => Severity::Moderate,
            _ => Severity::Severe,
        });
    }
    if let Some(severity) = Severity::ALL
        .iter()
        .find(|s| lower == s.label().to_lowercase())
    {
        return Some(*severity);
    }
    const SEVERE: &[&str] = &[
        "severe", "terrible", "worst", "unbearable", "excruciating", "really bad", "very bad",
        "agony",
    ];
    const MODERATE: &[&str] = &["moderate", "quite bad", "pretty bad", "getting worse"];
    const MILD: &[&str] = &["mild", "slight", "a little", "a bit", "minor"];
    if SEVERE.iter().any(|w| lower.contains(w)) {
        Some(Severity::Severe)
    } else if MODERATE.iter().any(|w| lower.contains(w)) {
        Some(Severity::Moderate)
    } else if MILD.iter().any(|w| lower.contains(w)) {
        Some(Severity::Mild)
    } else {
        None
    }
}

/// Reads how often the symptom happens.
pub fn parse_frequency(lower: &str) -> Option<Frequency> {
    if let Some(frequency) = Frequency::ALL
        .iter()
        .find(|f| lower == f.label().to_lowercase())
    {
        return Some(*frequency);
    }
    const CUES: &[(&str, Frequency)] = &[
        ("all the time", Frequency::Constant),
        ("constant", Frequency::Constant),
        ("non-stop", Frequency::Constant),
        ("won't go away", Frequency::Constant),
        ("keeps coming back", Frequency::Frequent),
        ("every day", Frequency::Frequent),
        ("daily", Frequency::Frequent),
        ("often", Frequency::Frequent),
        ("frequent", Frequency::Frequent),
        ("sometimes", Frequency::Occasional),
        ("occasional", Frequency::Occasional),
        ("comes and goes", Frequency::Occasional),
        ("now and then", Frequency::Occasional),
        ("first time", Frequency::FirstTime),
        ("never had", Frequency::FirstTime),
        ("never happened", Frequency::FirstTime),
    ];
    CUES.iter()
        .find(|(cue, _)| lower.contains(cue))
        .map(|(_, frequency)| *frequency)
}

fn parse_allergies(lower: &str) -> Vec<String> {
    ALLERGY
        .captures(lower)
        .map(|caps| split_list(&caps[1]))
        .unwrap_or_default()
}

/// Splits a list answer into items, dropping "none"-style answers.
pub fn split_list(text: &str) -> Vec<String> {
    let trimmed = text.trim().trim_end_matches('.');
    if NEGATIVE_ANSWERS.contains(&trimmed.to_lowercase().as_str()) {
        return Vec::new();
    }
    LIST_SEPARATOR
        .split(trimmed)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter(|item| !NEGATIVE_ANSWERS.contains(&item.to_lowercase().as_str()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, answering: Option<FollowUpQuestionType>, ctx: &HealthContext) -> HealthContextUpdate {
        KeywordExtractor::new().extract(text, answering, ctx)
    }

    mod first_message {
        use super::*;

        #[test]
        fn known_symptom_becomes_primary() {
            let update = extract("Mild headache for 2 days", None, &HealthContext::new());
            assert_eq!(update.primary_symptom.as_deref(), Some("headache"));
            assert_eq!(update.duration, Some(SymptomDuration::FewDays));
            assert_eq!(update.severity, Some(Severity::Mild));
        }

        #[test]
        fn later_symptoms_become_associated() {
            let update = extract("headache and feeling dizzy", None, &HealthContext::new());
            assert_eq!(update.primary_symptom.as_deref(), Some("headache"));
            assert_eq!(update.associated_symptoms, vec!["dizziness"]);
        }

        #[test]
        fn unknown_complaint_is_kept_verbatim() {
            let update = extract("My hand feels odd.", None, &HealthContext::new());
            assert_eq!(update.primary_symptom.as_deref(), Some("My hand feels odd"));
        }

        #[test]
        fn allergies_are_picked_up_anywhere() {
            let update = extract("rash, I'm allergic to penicillin", None, &HealthContext::new());
            assert_eq!(update.allergies, vec!["penicillin"]);
        }
    }

    mod answers {
        use super::*;

        fn with_primary() -> HealthContext {
            let mut ctx = HealthContext::new();
            ctx.primary_symptom = "cough".into();
            ctx
        }

        #[test]
        fn medication_answer_is_split() {
            let update = extract(
                "metformin, aspirin and lisinopril",
                Some(FollowUpQuestionType::Medications),
                &with_primary(),
            );
            assert_eq!(update.medications, vec!["metformin", "aspirin", "lisinopril"]);
        }

        #[test]
        fn negative_answer_adds_nothing() {
            let update = extract(
                "None of these",
                Some(FollowUpQuestionType::AssociatedSymptoms),
                &with_primary(),
            );
            assert!(update.associated_symptoms.is_empty());
        }

        #[test]
        fn unparsed_duration_answer_is_kept_as_note() {
            let update = extract(
                "hard to say",
                Some(FollowUpQuestionType::Duration),
                &with_primary(),
            );
            assert_eq!(update.duration, None);
            assert_eq!(update.note.as_deref(), Some("Duration: hard to say"));
        }

        #[test]
        fn quick_option_labels_parse_back() {
            let label = Severity::Moderate.label();
            let update = extract(label, Some(FollowUpQuestionType::Severity), &with_primary());
            assert_eq!(update.severity, Some(Severity::Moderate));
        }

        #[test]
        fn free_text_after_questions_becomes_a_note() {
            let update = extract("it gets worse at night", None, &with_primary());
            assert_eq!(update.note.as_deref(), Some("it gets worse at night"));
        }
    }

    mod parsers {
        use super::*;

        #[test]
        fn duration_amounts() {
            assert_eq!(parse_duration("about 3 hours"), Some(SymptomDuration::FewHours));
            assert_eq!(parse_duration("a week"), Some(SymptomDuration::OneWeek));
            assert_eq!(parse_duration("two weeks"), Some(SymptomDuration::MoreThanWeek));
            assert_eq!(parse_duration("6 months"), Some(SymptomDuration::Chronic));
            assert_eq!(parse_duration("since yesterday"), Some(SymptomDuration::OneDay));
            assert_eq!(parse_duration("no idea"), None);
        }

        #[test]
        fn pain_scale_maps_to_severity() {
            assert_eq!(parse_severity("about 8/10"), Some(Severity::Severe));
            assert_eq!(parse_severity("5 out of 10"), Some(Severity::Moderate));
            assert_eq!(parse_severity("2/10"), Some(Severity::Mild));
        }

        #[test]
        fn frequency_cues() {
            assert_eq!(parse_frequency("it comes and goes"), Some(Frequency::Occasional));
            assert_eq!(parse_frequency("first time ever"), Some(Frequency::FirstTime));
            assert_eq!(parse_frequency("all the time"), Some(Frequency::Constant));
        }
    }
}
