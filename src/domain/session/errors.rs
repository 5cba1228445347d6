//! Session errors.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, MemberId, MessageId, SessionId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("No active session for member {0}")]
    NoActiveSession(MemberId),

    #[error("Session {0} is no longer active")]
    Inactive(SessionId),

    #[error("Member {0} already has an active session")]
    AlreadyActive(MemberId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("No suggested action at position {0}")]
    ActionNotFound(usize),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) | SessionError::NoActiveSession(_) => {
                ErrorCode::SessionNotFound
            }
            SessionError::Inactive(_) => ErrorCode::SessionInactive,
            SessionError::AlreadyActive(_) => ErrorCode::SessionAlreadyActive,
            SessionError::MessageNotFound(_) | SessionError::ActionNotFound(_) => {
                ErrorCode::MessageNotFound
            }
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}
