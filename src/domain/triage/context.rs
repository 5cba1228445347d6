//! Health context accumulated over one conversation.
//!
//! The context is the structured record the triage engine reads. It only
//! grows during a session: fields are set or extended, never cleared.

use serde::{Deserialize, Serialize};

/// How long the primary symptom has been present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomDuration {
    JustNow,
    FewHours,
    OneDay,
    FewDays,
    OneWeek,
    MoreThanWeek,
    Chronic,
}

impl SymptomDuration {
    pub const ALL: [SymptomDuration; 7] = [
        Self::JustNow,
        Self::FewHours,
        Self::OneDay,
        Self::FewDays,
        Self::OneWeek,
        Self::MoreThanWeek,
        Self::Chronic,
    ];

    /// Human-readable label used in exports and quick options.
    pub fn label(&self) -> &'static str {
        match self {
            Self::JustNow => "Just started",
            Self::FewHours => "A few hours",
            Self::OneDay => "About a day",
            Self::FewDays => "2-3 days",
            Self::OneWeek => "About a week",
            Self::MoreThanWeek => "More than a week",
            Self::Chronic => "Ongoing for months",
        }
    }

    /// Onset within the last day.
    pub fn is_acute(&self) -> bool {
        matches!(self, Self::JustNow | Self::FewHours)
    }

    /// Present for a week or longer.
    pub fn is_persisting(&self) -> bool {
        matches!(self, Self::OneWeek | Self::MoreThanWeek | Self::Chronic)
    }
}

/// Self-reported intensity of the primary symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::Mild, Self::Moderate, Self::Severe];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mild => "Mild - noticeable but manageable",
            Self::Moderate => "Moderate - getting in the way of usual activities",
            Self::Severe => "Severe - hard to function",
        }
    }

    /// Short label without the explanatory suffix.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

/// How often the symptom occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    FirstTime,
    Occasional,
    Frequent,
    Constant,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Self::FirstTime,
        Self::Occasional,
        Self::Frequent,
        Self::Constant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstTime => "First time",
            Self::Occasional => "Comes and goes",
            Self::Frequent => "Happens often",
            Self::Constant => "Constant",
        }
    }
}

/// Structured health data gathered during one session.
///
/// # Invariants
///
/// - List fields never contain duplicates (case-insensitive, first spelling wins)
/// - Entries are trimmed and non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthContext {
    pub primary_symptom: String,
    pub duration: Option<SymptomDuration>,
    pub severity: Option<Severity>,
    pub frequency: Option<Frequency>,
    pub associated_symptoms: Vec<String>,
    pub risk_factors: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub recent_events: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub additional_notes: String,
}

/// A partial update merged into a [`HealthContext`].
///
/// Scalars overwrite when present; lists are appended with dedupe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthContextUpdate {
    pub primary_symptom: Option<String>,
    pub duration: Option<SymptomDuration>,
    pub severity: Option<Severity>,
    pub frequency: Option<Frequency>,
    pub associated_symptoms: Vec<String>,
    pub risk_factors: Vec<String>,
    pub chronic_conditions: Vec<String>,
    pub recent_events: Vec<String>,
    pub medications: Vec<String>,
    pub allergies: Vec<String>,
    pub note: Option<String>,
}

impl HealthContextUpdate {
    /// True if applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl HealthContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_primary_symptom(&self) -> bool {
        !self.primary_symptom.trim().is_empty()
    }

    /// Merges an update into this context.
    pub fn apply(&mut self, update: HealthContextUpdate) {
        if let Some(symptom) = update.primary_symptom {
            let symptom = symptom.trim();
            if !symptom.is_empty() {
                self.primary_symptom = symptom.to_string();
            }
        }
        if update.duration.is_some() {
            self.duration = update.duration;
        }
        if update.severity.is_some() {
            self.severity = update.severity;
        }
        if update.frequency.is_some() {
            self.frequency = update.frequency;
        }
        extend_unique(&mut self.associated_symptoms, update.associated_symptoms);
        extend_unique(&mut self.risk_factors, update.risk_factors);
        extend_unique(&mut self.chronic_conditions, update.chronic_conditions);
        extend_unique(&mut self.recent_events, update.recent_events);
        extend_unique(&mut self.medications, update.medications);
        extend_unique(&mut self.allergies, update.allergies);
        if let Some(note) = update.note {
            self.append_note(&note);
        }
    }

    /// Appends free text to the notes, one line per note.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        if !self.additional_notes.is_empty() {
            self.additional_notes.push('\n');
        }
        self.additional_notes.push_str(note);
    }

    /// Number of the seven scored fields that carry data.
    pub fn populated_field_count(&self) -> usize {
        [
            self.has_primary_symptom(),
            self.duration.is_some(),
            self.severity.is_some(),
            self.frequency.is_some(),
            !self.associated_symptoms.is_empty(),
            !self.medications.is_empty(),
            !self.chronic_conditions.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Inserts `item` unless an equal entry (ignoring case) already exists.
///
/// Returns true if the list grew.
pub fn push_unique(list: &mut Vec<String>, item: &str) -> bool {
    let item = item.trim();
    if item.is_empty() || list.iter().any(|existing| existing.eq_ignore_ascii_case(item)) {
        return false;
    }
    list.push(item.to_string());
    true
}

fn extend_unique(list: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        push_unique(list, &item);
    }
}
