//! Trial and subscription gate.
//!
//! Pure temporal and counter policy. Callers pass `now` explicitly.

use serde::{Deserialize, Serialize};

use super::access::{AccessDeniedReason, AccessGrant, AccessResult};
use crate::domain::foundation::Timestamp;

/// Default trial length in days.
pub const DEFAULT_TRIAL_DAYS: i64 = 3;

/// Default number of free questions once the trial is over.
pub const DEFAULT_FREE_QUESTION_QUOTA: u32 = 3;

/// One-time, time-boxed trial.
///
/// # Invariants
///
/// - Once `has_used_trial` is true, the dates never change
/// - `trial_end_date` is `trial_start_date` plus the trial length
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialState {
    pub trial_start_date: Option<Timestamp>,
    pub trial_end_date: Option<Timestamp>,
    pub has_used_trial: bool,
}

impl TrialState {
    /// Starts the trial. A trial that was ever started is never restarted.
    ///
    /// Returns true if the trial started now.
    pub fn start(&mut self, now: Timestamp, trial_days: i64) -> bool {
        if self.has_used_trial {
            return false;
        }
        self.trial_start_date = Some(now);
        self.trial_end_date = Some(now.add_days(trial_days));
        self.has_used_trial = true;
        true
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        self.trial_end_date
            .map_or(false, |end| now.is_before(&end))
    }

    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        match self.trial_end_date {
            Some(end) if now.is_before(&end) => {
                let secs = end.duration_since(&now).num_seconds();
                (secs + 86_399) / 86_400
            }
            _ => 0,
        }
    }
}

/// Subscription, trial and free-question counter for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessState {
    pub trial: TrialState,
    pub is_subscribed: bool,
    pub free_questions_used: u32,
    pub free_question_quota: u32,
    pub trial_days: i64,
}

impl Default for AccessState {
    fn default() -> Self {
        Self::new(DEFAULT_TRIAL_DAYS, DEFAULT_FREE_QUESTION_QUOTA)
    }
}

impl AccessState {
    pub fn new(trial_days: i64, free_question_quota: u32) -> Self {
        Self {
            trial: TrialState::default(),
            is_subscribed: false,
            free_questions_used: 0,
            free_question_quota,
            trial_days,
        }
    }

    /// Decides whether another question may be asked, and why.
    pub fn check_access(&self, now: Timestamp) -> AccessResult {
        if self.is_subscribed {
            return AccessResult::Allowed(AccessGrant::Subscribed);
        }
        if self.trial.is_active(now) {
            return AccessResult::Allowed(AccessGrant::TrialActive);
        }
        if !self.trial.has_used_trial {
            return AccessResult::Allowed(AccessGrant::TrialEligible);
        }
        if self.free_questions_used < self.free_question_quota {
            return AccessResult::Allowed(AccessGrant::FreeQuestion {
                remaining: self.free_question_quota - self.free_questions_used,
            });
        }
        AccessResult::Denied(AccessDeniedReason::FreeQuotaExhausted {
            used: self.free_questions_used,
            quota: self.free_question_quota,
        })
    }

    pub fn can_ask_question(&self, now: Timestamp) -> bool {
        self.check_access(now).is_allowed()
    }

    /// Silent no-op once a trial was ever started.
    pub fn start_trial(&mut self, now: Timestamp) -> bool {
        self.trial.start(now, self.trial_days)
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        self.is_subscribed = subscribed;
    }

    /// Counts a question against the free quota when it came from there.
    pub fn record_question_asked(&mut self, now: Timestamp) {
        if !self.is_subscribed && !self.trial.is_active(now) {
            self.free_questions_used = self.free_questions_used.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Timestamp {
        Timestamp::now()
    }

    mod trial {
        use super::*;

        #[test]
        fn start_sets_three_day_window() {
            let now = t0();
            let mut trial = TrialState::default();
            assert!(trial.start(now, DEFAULT_TRIAL_DAYS));
            assert_eq!(trial.trial_start_date, Some(now));
            assert_eq!(trial.trial_end_date, Some(now.add_days(3)));
            assert!(trial.is_active(now));
            assert_eq!(trial.days_remaining(now), 3);
        }

        #[test]
        fn starting_twice_is_a_no_op() {
            let now = t0();
            let mut access = AccessState::default();
            assert!(access.start_trial(now));
            let first_end = access.trial.trial_end_date;
            assert!(!access.start_trial(now.add_days(10)));
            assert!(access.trial.has_used_trial);
            assert_eq!(access.trial.trial_end_date, first_end);
        }

        #[test]
        fn trial_expires_at_end_date() {
            let now = t0();
            let mut trial = TrialState::default();
            trial.start(now, 3);
            assert!(!trial.is_active(now.add_days(3)));
            assert_eq!(trial.days_remaining(now.add_days(4)), 0);
        }
    }

    mod gate {
        use super::*;

        #[test]
        fn subscriber_always_allowed() {
            let mut access = AccessState::default();
            access.trial.start(t0().minus_days(30), 3);
            access.free_questions_used = 99;
            access.set_subscribed(true);
            assert_eq!(
                access.check_access(t0()),
                AccessResult::Allowed(AccessGrant::Subscribed)
            );
        }

        #[test]
        fn never_started_trial_is_eligible() {
            let access = AccessState::default();
            assert_eq!(
                access.check_access(t0()),
                AccessResult::Allowed(AccessGrant::TrialEligible)
            );
        }

        #[test]
        fn active_trial_allows_and_does_not_count() {
            let now = t0();
            let mut access = AccessState::default();
            access.start_trial(now);
            access.record_question_asked(now);
            assert_eq!(access.free_questions_used, 0);
            assert!(access.can_ask_question(now));
        }

        #[test]
        fn expired_trial_falls_back_to_quota() {
            let start = t0();
            let later = start.add_days(5);
            let mut access = AccessState::new(3, 2);
            access.start_trial(start);
            assert!(access.can_ask_question(later));
            access.record_question_asked(later);
            access.record_question_asked(later);
            assert_eq!(
                access.check_access(later),
                AccessResult::Denied(AccessDeniedReason::FreeQuotaExhausted { used: 2, quota: 2 })
            );
        }
    }
}
