//! Feedback ledger.
//!
//! Append-only record of helpful/not-helpful ratings on assistant messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{FeedbackId, MessageId, Percentage, SessionId, Timestamp};

/// Characters of the rated message kept with the entry.
pub const SNIPPET_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRating {
    Helpful,
    NotHelpful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    TooLong,
    DidntAnswer,
    FeltUnsafe,
    Other,
}

impl FeedbackReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TooLong => "Too long",
            Self::DidntAnswer => "Didn't answer my question",
            Self::FeltUnsafe => "Felt unsafe",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for FeedbackReason {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "too_long" => Ok(Self::TooLong),
            "didnt_answer" | "didn't_answer" => Ok(Self::DidntAnswer),
            "felt_unsafe" => Ok(Self::FeltUnsafe),
            "other" => Ok(Self::Other),
            other => Err(FeedbackError::UnknownReason(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    #[error("A reason can only be given for 'not helpful' feedback")]
    ReasonWithoutNegativeRating,

    #[error("Unknown feedback reason: {0}")]
    UnknownReason(String),
}

/// What the caller submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub episode_id: SessionId,
    pub message_id: MessageId,
    pub rating: FeedbackRating,
    pub reason: Option<FeedbackReason>,
    pub custom_reason: Option<String>,
}

impl FeedbackSubmission {
    pub fn helpful(episode_id: SessionId, message_id: MessageId) -> Self {
        Self {
            episode_id,
            message_id,
            rating: FeedbackRating::Helpful,
            reason: None,
            custom_reason: None,
        }
    }

    pub fn not_helpful(
        episode_id: SessionId,
        message_id: MessageId,
        reason: Option<FeedbackReason>,
    ) -> Self {
        Self {
            episode_id,
            message_id,
            rating: FeedbackRating::NotHelpful,
            reason,
            custom_reason: None,
        }
    }

    pub fn with_custom_reason(mut self, text: impl Into<String>) -> Self {
        self.custom_reason = Some(text.into());
        self
    }
}

/// One immutable rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: FeedbackId,
    pub episode_id: SessionId,
    pub message_id: MessageId,
    pub rating: FeedbackRating,
    pub reason: Option<FeedbackReason>,
    pub custom_reason: Option<String>,
    pub message_snippet: String,
    pub timestamp: Timestamp,
}

impl FeedbackEntry {
    /// Builds an entry for a rated message.
    ///
    /// # Errors
    ///
    /// - `ReasonWithoutNegativeRating` if a reason accompanies a helpful rating
    pub fn new(
        submission: FeedbackSubmission,
        message_text: &str,
        now: Timestamp,
    ) -> Result<Self, FeedbackError> {
        if submission.rating == FeedbackRating::Helpful && submission.reason.is_some() {
            return Err(FeedbackError::ReasonWithoutNegativeRating);
        }
        let custom_reason = submission
            .custom_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok(Self {
            id: FeedbackId::new(),
            episode_id: submission.episode_id,
            message_id: submission.message_id,
            rating: submission.rating,
            reason: submission.reason,
            custom_reason,
            message_snippet: snippet(message_text),
            timestamp: now,
        })
    }
}

/// First [`SNIPPET_LENGTH`] characters of `text`.
pub fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LENGTH).collect()
}

/// Count of negative ratings per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonBreakdown {
    pub too_long: u32,
    pub didnt_answer: u32,
    pub felt_unsafe: u32,
    pub other: u32,
}

impl ReasonBreakdown {
    fn count(&mut self, reason: FeedbackReason) {
        match reason {
            FeedbackReason::TooLong => self.too_long += 1,
            FeedbackReason::DidntAnswer => self.didnt_answer += 1,
            FeedbackReason::FeltUnsafe => self.felt_unsafe += 1,
            FeedbackReason::Other => self.other += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total: u32,
    pub helpful: u32,
    pub not_helpful: u32,
    pub helpful_rate: Percentage,
    pub reason_breakdown: ReasonBreakdown,
}

/// Append-only ledger plus the current rating per message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackLedger {
    entries: Vec<FeedbackEntry>,
    rated_messages: BTreeMap<MessageId, FeedbackRating>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. A later rating for the same message replaces the
    /// current rating but never removes the earlier entry.
    pub fn record(&mut self, entry: FeedbackEntry) -> &FeedbackEntry {
        self.rated_messages.insert(entry.message_id, entry.rating);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn rating_for(&self, message_id: &MessageId) -> Option<FeedbackRating> {
        self.rated_messages.get(message_id).copied()
    }

    pub fn entries_for_episode(&self, episode_id: &SessionId) -> Vec<&FeedbackEntry> {
        self.entries
            .iter()
            .filter(|e| &e.episode_id == episode_id)
            .collect()
    }

    pub fn summary(&self) -> FeedbackSummary {
        let mut helpful = 0;
        let mut not_helpful = 0;
        let mut reason_breakdown = ReasonBreakdown::default();
        for entry in &self.entries {
            match entry.rating {
                FeedbackRating::Helpful => helpful += 1,
                FeedbackRating::NotHelpful => {
                    not_helpful += 1;
                    if let Some(reason) = entry.reason {
                        reason_breakdown.count(reason);
                    }
                }
            }
        }
        let total = helpful + not_helpful;
        FeedbackSummary {
            total,
            helpful,
            not_helpful,
            helpful_rate: Percentage::of(helpful as usize, total as usize),
            reason_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn negative(reason: FeedbackReason) -> FeedbackEntry {
        let sub = FeedbackSubmission::not_helpful(SessionId::new(), MessageId::new(), Some(reason));
        FeedbackEntry::new(sub, "text", Timestamp::now()).unwrap()
    }

    mod entries {
        use super::*;

        #[test]
        fn long_message_snippet_is_exactly_one_hundred_chars() {
            let text = "é".repeat(150);
            let sub = FeedbackSubmission::helpful(SessionId::new(), MessageId::new());
            let entry = FeedbackEntry::new(sub, &text, Timestamp::now()).unwrap();
            assert_eq!(entry.message_snippet.chars().count(), 100);
        }

        #[test]
        fn short_message_is_kept_whole() {
            assert_eq!(snippet("short"), "short");
        }

        #[test]
        fn reason_on_helpful_rating_is_rejected() {
            let mut sub = FeedbackSubmission::helpful(SessionId::new(), MessageId::new());
            sub.reason = Some(FeedbackReason::TooLong);
            assert_eq!(
                FeedbackEntry::new(sub, "x", Timestamp::now()),
                Err(FeedbackError::ReasonWithoutNegativeRating)
            );
        }

        #[test]
        fn blank_custom_reason_is_dropped() {
            let sub = FeedbackSubmission::not_helpful(SessionId::new(), MessageId::new(), None)
                .with_custom_reason("   ");
            let entry = FeedbackEntry::new(sub, "x", Timestamp::now()).unwrap();
            assert_eq!(entry.custom_reason, None);
        }

        #[test]
        fn reasons_parse_from_user_input() {
            assert_eq!("too long".parse::<FeedbackReason>(), Ok(FeedbackReason::TooLong));
            assert_eq!("didnt_answer".parse::<FeedbackReason>(), Ok(FeedbackReason::DidntAnswer));
            assert!("boring".parse::<FeedbackReason>().is_err());
        }
    }

    mod ledger {
        use super::*;

        #[test]
        fn reason_breakdown_counts_every_negative_entry() {
            let mut ledger = FeedbackLedger::new();
            ledger.record(negative(FeedbackReason::TooLong));
            ledger.record(negative(FeedbackReason::TooLong));
            ledger.record(negative(FeedbackReason::DidntAnswer));
            let summary = ledger.summary();
            assert_eq!(
                summary.reason_breakdown,
                ReasonBreakdown {
                    too_long: 2,
                    didnt_answer: 1,
                    felt_unsafe: 0,
                    other: 0
                }
            );
            assert_eq!(summary.not_helpful, 3);
            assert_eq!(summary.helpful_rate, Percentage::ZERO);
        }

        #[test]
        fn rerating_keeps_history_and_updates_current_rating() {
            let mut ledger = FeedbackLedger::new();
            let episode = SessionId::new();
            let message = MessageId::new();
            let first = FeedbackSubmission::not_helpful(episode, message, None);
            ledger.record(FeedbackEntry::new(first, "x", Timestamp::now()).unwrap());
            let second = FeedbackSubmission::helpful(episode, message);
            ledger.record(FeedbackEntry::new(second, "x", Timestamp::now()).unwrap());
            assert_eq!(ledger.entries().len(), 2);
            assert_eq!(ledger.rating_for(&message), Some(FeedbackRating::Helpful));
            assert_eq!(ledger.entries_for_episode(&episode).len(), 2);
        }

        #[test]
        fn breakdown_serializes_with_snake_case_keys() {
            let json = serde_json::to_value(ReasonBreakdown::default()).unwrap();
            assert_eq!(json["didnt_answer"], 0);
        }
    }
}
