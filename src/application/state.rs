//! Persisted assistant state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, SessionId};
use crate::domain::membership::AccessState;
use crate::domain::session::AskCarebowSession;

/// Trial, subscription and session history for one account.
///
/// Stored as a single record; see `Persistence::ASSISTANT_KEY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantState {
    #[serde(default)]
    pub access: AccessState,
    /// Oldest first.
    #[serde(default)]
    pub sessions: Vec<AskCarebowSession>,
}

impl AssistantState {
    pub fn session(&self, id: &SessionId) -> Option<&AskCarebowSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn session_mut(&mut self, id: &SessionId) -> Option<&mut AskCarebowSession> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    pub fn active_session_for(&self, member_id: &MemberId) -> Option<&AskCarebowSession> {
        self.sessions
            .iter()
            .find(|s| s.is_active() && s.member_id() == member_id)
    }

    /// Drops the oldest ended sessions until at most `max` remain.
    /// Active sessions are never dropped.
    pub fn trim_history(&mut self, max: usize) -> usize {
        let mut dropped = 0;
        while self.sessions.len() > max {
            match self.sessions.iter().position(|s| !s.is_active()) {
                Some(pos) => {
                    self.sessions.remove(pos);
                    dropped += 1;
                }
                None => break,
            }
        }
        dropped
    }
}
