//! Read-side projections over the session history.
//!
//! All queries return newest sessions first.

use crate::domain::foundation::MemberId;
use crate::domain::session::AskCarebowSession;

fn newest_first<'a>(
    sessions: impl DoubleEndedIterator<Item = &'a AskCarebowSession>,
) -> Vec<&'a AskCarebowSession> {
    let mut out: Vec<_> = sessions.rev().collect();
    // history is stored oldest first, but imported records may not be
    out.sort_by(|a, b| b.started_at().cmp(a.started_at()));
    out
}

pub fn sessions_for_member<'a>(
    sessions: &'a [AskCarebowSession],
    member_id: &MemberId,
) -> Vec<&'a AskCarebowSession> {
    newest_first(sessions.iter().filter(|s| s.member_id() == member_id))
}

pub fn recent_sessions(sessions: &[AskCarebowSession], limit: usize) -> Vec<&AskCarebowSession> {
    let mut out = newest_first(sessions.iter());
    out.truncate(limit);
    out
}

pub fn emergency_sessions(sessions: &[AskCarebowSession]) -> Vec<&AskCarebowSession> {
    newest_first(sessions.iter().filter(|s| s.triggered_emergency_flow()))
}

pub fn sessions_with_feedback(sessions: &[AskCarebowSession]) -> Vec<&AskCarebowSession> {
    newest_first(sessions.iter().filter(|s| s.has_feedback()))
}
