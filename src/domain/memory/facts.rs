//! Durable health facts and history records.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FactId, SessionId, Timestamp};
use crate::domain::triage::UrgencyLevel;

/// Which list a fact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Condition,
    Medication,
    Allergy,
}

impl FactKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Condition => "condition",
            Self::Medication => "medication",
            Self::Allergy => "allergy",
        }
    }
}

/// Where a fact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactSource {
    ConversationExtracted,
    UserReported,
    DoctorConfirmed,
}

/// A condition, medication or allergy with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFact {
    pub id: FactId,
    pub content: String,
    pub source: FactSource,
    pub first_recorded: Timestamp,
    pub last_mentioned: Timestamp,
    #[serde(default)]
    pub source_episode: Option<SessionId>,
}

impl HealthFact {
    pub fn new(
        content: &str,
        source: FactSource,
        source_episode: Option<SessionId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: FactId::new(),
            content: content.trim().to_string(),
            source,
            first_recorded: now,
            last_mentioned: now,
            source_episode,
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        self.content.eq_ignore_ascii_case(content.trim())
    }

    /// Refreshes `last_mentioned`; a stronger source replaces a weaker one.
    pub fn touch(&mut self, source: FactSource, now: Timestamp) {
        self.last_mentioned = now;
        if source > self.source {
            self.source = source;
        }
    }
}

/// Something that happened to the member (a fall, a hospital stay...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub description: String,
    pub recorded_at: Timestamp,
    #[serde(default)]
    pub source_episode: Option<SessionId>,
}

/// How often a symptom has come up across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomPattern {
    pub symptom: String,
    pub occurrences: u32,
    pub first_seen: Timestamp,
    pub last_seen: Timestamp,
    pub episodes: Vec<SessionId>,
}

impl SymptomPattern {
    pub fn is_recurring(&self) -> bool {
        self.occurrences >= 2
    }
}

/// Short record of one finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub episode_id: SessionId,
    pub date: Timestamp,
    pub chief_complaint: String,
    pub urgency_level: Option<UrgencyLevel>,
    pub triggered_emergency: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_upgrades_but_never_downgrades_source() {
        let t0 = Timestamp::now();
        let mut fact = HealthFact::new("diabetes", FactSource::UserReported, None, t0);
        fact.touch(FactSource::ConversationExtracted, t0.plus_secs(60));
        assert_eq!(fact.source, FactSource::UserReported);
        assert_eq!(fact.last_mentioned, t0.plus_secs(60));
        fact.touch(FactSource::DoctorConfirmed, t0.plus_secs(120));
        assert_eq!(fact.source, FactSource::DoctorConfirmed);
        assert_eq!(fact.first_recorded, t0);
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let fact = HealthFact::new("Metformin", FactSource::UserReported, None, Timestamp::now());
        assert!(fact.matches(" metformin "));
        assert!(!fact.matches("aspirin"));
    }
}
