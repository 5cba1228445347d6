//! Proposed facts awaiting confirmation.

use serde::{Deserialize, Serialize};

use super::errors::MemoryError;
use super::facts::FactKind;
use crate::domain::foundation::{CandidateId, Percentage, SessionId, Timestamp};

/// A fact extracted from a session that has not been confirmed yet.
///
/// # Invariants
///
/// - `processed` goes false → true exactly once
/// - `promoted` is only ever true for accepted candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCandidate {
    pub id: CandidateId,
    pub kind: FactKind,
    pub content: String,
    pub confidence: Percentage,
    pub source_episode: SessionId,
    pub created_at: Timestamp,
    pub processed: bool,
    pub accepted_by_user: Option<bool>,
    pub processed_at: Option<Timestamp>,
    pub promoted: bool,
}

impl MemoryCandidate {
    pub fn new(
        kind: FactKind,
        content: &str,
        confidence: Percentage,
        source_episode: SessionId,
        now: Timestamp,
    ) -> Self {
        Self {
            id: CandidateId::new(),
            kind,
            content: content.trim().to_string(),
            confidence,
            source_episode,
            created_at: now,
            processed: false,
            accepted_by_user: None,
            processed_at: None,
            promoted: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.processed
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_by_user == Some(true)
    }

    /// Nothing left to do: rejected, or accepted and promoted.
    pub fn is_settled(&self) -> bool {
        self.processed && (!self.is_accepted() || self.promoted)
    }

    /// Records the user's decision. One-way.
    pub fn process(&mut self, accepted: bool, now: Timestamp) -> Result<(), MemoryError> {
        if self.processed {
            return Err(MemoryError::CandidateAlreadyProcessed(self.id));
        }
        self.processed = true;
        self.accepted_by_user = Some(accepted);
        self.processed_at = Some(now);
        Ok(())
    }

    /// Checks the candidate may be promoted and marks it promoted.
    pub fn mark_promoted(&mut self) -> Result<(), MemoryError> {
        if !self.is_accepted() {
            return Err(MemoryError::CandidateNotAccepted(self.id));
        }
        if self.promoted {
            return Err(MemoryError::CandidateAlreadyPromoted(self.id));
        }
        self.promoted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> MemoryCandidate {
        MemoryCandidate::new(
            FactKind::Medication,
            "aspirin",
            Percentage::new(70),
            SessionId::new(),
            Timestamp::now(),
        )
    }

    #[test]
    fn processing_is_one_way() {
        let mut c = candidate();
        c.process(true, Timestamp::now()).unwrap();
        assert!(c.processed);
        assert_eq!(
            c.process(false, Timestamp::now()),
            Err(MemoryError::CandidateAlreadyProcessed(c.id))
        );
        assert_eq!(c.accepted_by_user, Some(true));
    }

    #[test]
    fn unprocessed_or_rejected_cannot_be_promoted() {
        let mut c = candidate();
        assert_eq!(c.mark_promoted(), Err(MemoryError::CandidateNotAccepted(c.id)));
        c.process(false, Timestamp::now()).unwrap();
        assert_eq!(c.mark_promoted(), Err(MemoryError::CandidateNotAccepted(c.id)));
        assert!(!c.promoted);
    }

    #[test]
    fn accepted_candidate_promotes_once() {
        let mut c = candidate();
        c.process(true, Timestamp::now()).unwrap();
        assert!(c.mark_promoted().is_ok());
        assert_eq!(c.mark_promoted(), Err(MemoryError::CandidateAlreadyPromoted(c.id)));
    }
}
