//! Trial and subscription gate.

pub mod access;
pub mod trial;

pub use access::{AccessDeniedReason, AccessGrant, AccessResult};
pub use trial::{AccessState, TrialState, DEFAULT_FREE_QUESTION_QUOTA, DEFAULT_TRIAL_DAYS};
