//! Member health memory errors.

use thiserror::Error;

use crate::domain::foundation::{CandidateId, ErrorCode, FactId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Memory candidate not found: {0}")]
    CandidateNotFound(CandidateId),

    #[error("Memory candidate {0} was already processed")]
    CandidateAlreadyProcessed(CandidateId),

    #[error("Memory candidate {0} was not accepted")]
    CandidateNotAccepted(CandidateId),

    #[error("Memory candidate {0} was already promoted")]
    CandidateAlreadyPromoted(CandidateId),

    #[error("Health fact not found: {0}")]
    FactNotFound(FactId),
}

impl MemoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MemoryError::CandidateNotFound(_) => ErrorCode::CandidateNotFound,
            MemoryError::CandidateAlreadyProcessed(_) | MemoryError::CandidateAlreadyPromoted(_) => {
                ErrorCode::CandidateAlreadyProcessed
            }
            MemoryError::CandidateNotAccepted(_) => ErrorCode::CandidateNotAccepted,
            MemoryError::FactNotFound(_) => ErrorCode::FactNotFound,
        }
    }
}
