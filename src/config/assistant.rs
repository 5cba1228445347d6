//! Assistant behaviour configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::conversation::MinimumContextPolicy;
use crate::domain::membership::{DEFAULT_FREE_QUESTION_QUOTA, DEFAULT_TRIAL_DAYS};
use crate::domain::memory::MemoryLimits;

/// Trial, history and memory settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Length of the free trial in days
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,

    /// Questions allowed outside a trial or subscription
    #[serde(default = "default_free_question_quota")]
    pub free_question_quota: u32,

    /// Most sessions kept in the history
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Most recent events kept per member
    #[serde(default = "default_max_recent_events")]
    pub max_recent_events: usize,

    /// Conversation summaries older than this are dropped
    #[serde(default = "default_summary_window_days")]
    pub summary_window_days: i64,

    /// Most conversation summaries kept per member
    #[serde(default = "default_max_summaries")]
    pub max_summaries: usize,

    /// Populated context fields needed before assessing
    #[serde(default = "default_readiness_min_fields")]
    pub readiness_min_fields: usize,
}

impl AssistantConfig {
    pub fn memory_limits(&self) -> MemoryLimits {
        MemoryLimits {
            max_recent_events: self.max_recent_events,
            summary_window_days: self.summary_window_days,
            max_summaries: self.max_summaries,
        }
    }

    pub fn readiness_policy(&self) -> MinimumContextPolicy {
        MinimumContextPolicy::new(self.readiness_min_fields)
    }

    /// Validate assistant configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=30).contains(&self.trial_days) {
            return Err(ValidationError::InvalidTrialDays);
        }
        if self.free_question_quota > 100 {
            return Err(ValidationError::InvalidFreeQuota);
        }
        if self.max_sessions == 0 {
            return Err(ValidationError::InvalidHistoryCap);
        }
        if self.max_recent_events == 0 || self.summary_window_days <= 0 || self.max_summaries == 0 {
            return Err(ValidationError::InvalidMemoryLimits);
        }
        // primary symptom, duration and severity are always required
        if !(3..=7).contains(&self.readiness_min_fields) {
            return Err(ValidationError::InvalidReadinessMinimum);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            trial_days: default_trial_days(),
            free_question_quota: default_free_question_quota(),
            max_sessions: default_max_sessions(),
            max_recent_events: default_max_recent_events(),
            summary_window_days: default_summary_window_days(),
            max_summaries: default_max_summaries(),
            readiness_min_fields: default_readiness_min_fields(),
        }
    }
}

fn default_trial_days() -> i64 {
    DEFAULT_TRIAL_DAYS
}

fn default_free_question_quota() -> u32 {
    DEFAULT_FREE_QUESTION_QUOTA
}

fn default_max_sessions() -> usize {
    200
}

fn default_max_recent_events() -> usize {
    MemoryLimits::default().max_recent_events
}

fn default_summary_window_days() -> i64 {
    MemoryLimits::default().summary_window_days
}

fn default_max_summaries() -> usize {
    MemoryLimits::default().max_summaries
}

fn default_readiness_min_fields() -> usize {
    MinimumContextPolicy::DEFAULT_MIN_FIELDS
}
