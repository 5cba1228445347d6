//! Access decisions for asking questions.

use serde::{Deserialize, Serialize};

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    Allowed(AccessGrant),
    Denied(AccessDeniedReason),
}

impl AccessResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed(_))
    }
}

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGrant {
    Subscribed,
    TrialActive,
    /// Trial never started; the first question starts it.
    TrialEligible,
    FreeQuestion { remaining: u32 },
}

/// Why access was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessDeniedReason {
    /// Trial over and the free questions are used up.
    FreeQuotaExhausted { used: u32, quota: u32 },
}

impl AccessDeniedReason {
    /// User-facing message for the denial.
    pub fn user_message(&self) -> String {
        match self {
            AccessDeniedReason::FreeQuotaExhausted { quota, .. } => format!(
                "You've used all {} free questions. Subscribe to keep asking CareBow.",
                quota
            ),
        }
    }
}

impl std::fmt::Display for AccessDeniedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}
