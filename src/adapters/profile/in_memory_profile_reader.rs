//! In-memory MemberProfileReader for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, MemberId};
use crate::domain::triage::MemberProfile;
use crate::ports::MemberProfileReader;

/// Profile lookup backed by a shared map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileReader {
    profiles: Arc<RwLock<HashMap<MemberId, MemberProfile>>>,
}

impl InMemoryProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a reader pre-populated with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = MemberProfile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.member_id.clone(), p))
            .collect();
        Self {
            profiles: Arc::new(RwLock::new(map)),
        }
    }

    pub async fn insert(&self, profile: MemberProfile) {
        self.profiles
            .write()
            .await
            .insert(profile.member_id.clone(), profile);
    }
}

#[async_trait]
impl MemberProfileReader for InMemoryProfileReader {
    async fn get_profile(&self, member_id: &MemberId) -> Result<Option<MemberProfile>, DomainError> {
        Ok(self.profiles.read().await.get(member_id).cloned())
    }
}
