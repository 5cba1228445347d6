//! Emergency red-flag detection.
//!
//! Plain substring matching over normalised text. Over-triggering is the
//! acceptable failure mode, so matching stays literal and the phrase list is
//! easy to extend.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Phrases strongly associated with a medical emergency.
pub const RED_FLAG_PHRASES: &[&str] = &[
    "chest pain",
    "chest tightness",
    "heart attack",
    "can't breathe",
    "cannot breathe",
    "difficulty breathing",
    "trouble breathing",
    "struggling to breathe",
    "shortness of breath",
    "choking",
    "blue lips",
    "unconscious",
    "unresponsive",
    "passed out",
    "fainted",
    "seizure",
    "stroke",
    "face drooping",
    "slurred speech",
    "sudden numbness",
    "sudden weakness",
    "sudden confusion",
    "worst headache",
    "severe head injury",
    "severe bleeding",
    "bleeding heavily",
    "won't stop bleeding",
    "coughing up blood",
    "vomiting blood",
    "severe allergic reaction",
    "throat swelling",
    "anaphylaxis",
    "overdose",
    "poisoning",
    "suicidal",
    "kill myself",
    "want to die",
    "end my life",
];

/// Phrases that raise urgency without constituting an emergency.
pub const URGENT_INDICATORS: &[&str] = &[
    "high fever",
    "fever of 103",
    "fever of 104",
    "stiff neck",
    "confusion",
    "dehydrated",
    "can't keep fluids down",
    "fall",
    "fell",
    "blood in urine",
    "blood in stool",
    "severe pain",
    "swollen leg",
    "rapid heartbeat",
    "not eating",
];

/// Classification attached to a positive detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmergencyType {
    #[serde(rename = "P1_EMERGENCY")]
    P1Emergency,
}

impl EmergencyType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::P1Emergency => "P1_EMERGENCY",
        }
    }
}

/// Outcome of running the detector over a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub is_emergency: bool,
    pub emergency_type: Option<EmergencyType>,
    pub matched_phrases: Vec<String>,
    pub detected_at: Option<Timestamp>,
}

impl EmergencyState {
    /// State with no detection.
    pub fn clear() -> Self {
        Self::default()
    }

    /// Builds the state from a list of matches; empty means no emergency.
    pub fn from_matches(matched_phrases: Vec<String>, now: Timestamp) -> Self {
        if matched_phrases.is_empty() {
            return Self::clear();
        }
        Self {
            is_emergency: true,
            emergency_type: Some(EmergencyType::P1Emergency),
            matched_phrases,
            detected_at: Some(now),
        }
    }
}

/// Substring detector over a fixed, extendable phrase vocabulary.
#[derive(Debug, Clone)]
pub struct RedFlagDetector {
    phrases: Vec<(String, String)>,
}

impl Default for RedFlagDetector {
    fn default() -> Self {
        Self::with_phrases(RED_FLAG_PHRASES.iter().copied())
    }
}

impl RedFlagDetector {
    /// Detector over the standard vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector over a custom vocabulary.
    pub fn with_phrases<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        let phrases = phrases
            .into_iter()
            .map(|p| (p.to_string(), normalize(p)))
            .filter(|(_, normalized)| !normalized.is_empty())
            .collect();
        Self { phrases }
    }

    /// Adds phrases on top of the current vocabulary.
    pub fn extended_with<'a>(mut self, extra: impl IntoIterator<Item = &'a str>) -> Self {
        for phrase in extra {
            let normalized = normalize(phrase);
            if !normalized.is_empty() && !self.phrases.iter().any(|(_, n)| *n == normalized) {
                self.phrases.push((phrase.to_string(), normalized));
            }
        }
        self
    }

    /// Returns the vocabulary phrases found in `text`, in vocabulary order.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let haystack = normalize(text);
        self.phrases
            .iter()
            .filter(|(_, needle)| haystack.contains(needle.as_str()))
            .map(|(original, _)| original.clone())
            .collect()
    }

    /// Runs detection and wraps the result as an [`EmergencyState`].
    pub fn assess(&self, text: &str, now: Timestamp) -> EmergencyState {
        EmergencyState::from_matches(self.detect(text), now)
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }
}

/// Finds urgency-raising indicators in free text.
pub fn detect_urgent_indicators(text: &str) -> Vec<String> {
    let haystack = normalize(text);
    let words: Vec<&str> = haystack.split(' ').collect();
    URGENT_INDICATORS
        .iter()
        .filter(|indicator| {
            let needle = normalize(indicator);
            if needle.contains(' ') {
                haystack.contains(needle.as_str())
            } else {
                // single words match whole words only ("fall" must not hit "fallen arches")
                words.iter().any(|w| *w == needle)
            }
        })
        .map(|s| s.to_string())
        .collect()
}

/// Lowercases, drops apostrophes and collapses whitespace.
///
/// Applied to both the vocabulary and the input so that "Can’t  Breathe",
/// "cant breathe" and "can't breathe" compare equal.
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '\u{2018}' | '`'))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
