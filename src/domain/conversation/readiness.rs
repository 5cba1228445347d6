//! When to stop asking questions and assess.

use std::fmt::Debug;

use crate::domain::triage::HealthContext;

/// Decides whether enough context exists to run triage.
pub trait ReadinessPolicy: Debug + Send + Sync {
    fn is_ready(&self, context: &HealthContext, questions_asked: usize) -> bool;
}

/// Ready once the primary symptom, duration and severity are known and at
/// least `min_fields` scored fields carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumContextPolicy {
    pub min_fields: usize,
}

impl MinimumContextPolicy {
    pub const DEFAULT_MIN_FIELDS: usize = 4;

    pub fn new(min_fields: usize) -> Self {
        Self { min_fields }
    }
}

impl Default for MinimumContextPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_FIELDS)
    }
}

impl ReadinessPolicy for MinimumContextPolicy {
    fn is_ready(&self, context: &HealthContext, _questions_asked: usize) -> bool {
        context.has_primary_symptom()
            && context.duration.is_some()
            && context.severity.is_some()
            && context.populated_field_count() >= self.min_fields
    }
}
