//! MemberProfileReader port for looking up care recipients.

use async_trait::async_trait;

use crate::domain::{
    foundation::{DomainError, MemberId},
    triage::MemberProfile,
};

/// Query operations for member profiles.
///
/// Profiles are owned elsewhere; the assistant only reads a snapshot when a
/// session starts.
#[async_trait]
pub trait MemberProfileReader: Send + Sync {
    /// Get the profile for a member, `None` if the member has none on file.
    async fn get_profile(&self, member_id: &MemberId) -> Result<Option<MemberProfile>, DomainError>;
}
