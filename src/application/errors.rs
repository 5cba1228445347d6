//! Application-level errors.

use thiserror::Error;

use crate::domain::feedback::FeedbackError;
use crate::domain::foundation::ErrorCode;
use crate::domain::membership::AccessDeniedReason;
use crate::domain::memory::MemoryError;
use crate::domain::session::SessionError;
use crate::ports::StorageError;

/// Everything a `CareAssistant` operation can fail with.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    AccessDenied(AccessDeniedReason),

    #[error("Export failed: {0}")]
    Export(String),
}

impl AssistantError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AssistantError::Session(err) => err.code(),
            AssistantError::Memory(err) => err.code(),
            AssistantError::Feedback(_) => ErrorCode::ValidationFailed,
            AssistantError::Storage(_) => ErrorCode::StorageError,
            AssistantError::AccessDenied(_) => ErrorCode::AccessDenied,
            AssistantError::Export(_) => ErrorCode::InternalError,
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Export(err.to_string())
    }
}
