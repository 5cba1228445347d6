//! Triage domain module.
//!
//! Holds the per-session health context, the red-flag detector and the rule
//! based triage engine that turns collected context into an urgency level.

pub mod context;
pub mod engine;
pub mod profile;
pub mod red_flags;
pub mod urgency;

pub use context::{
    push_unique, Frequency, HealthContext, HealthContextUpdate, Severity, SymptomDuration,
};
pub use engine::{ConfidenceWeights, TriageEngine, TriageFactor, TriageInput, TriageResult};
pub use profile::{MemberProfile, Relationship};
pub use red_flags::{
    detect_urgent_indicators, EmergencyState, EmergencyType, RedFlagDetector, RED_FLAG_PHRASES,
};
pub use urgency::{TriageLevel, UrgencyDisplay, UrgencyLevel, URGENCY_DISPLAY, URGENCY_TABLE_VERSION};
