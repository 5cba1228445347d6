//! Longitudinal per-member health memory.

pub mod candidate;
pub mod errors;
pub mod facts;
pub mod member;

pub use candidate::MemoryCandidate;
pub use errors::MemoryError;
pub use facts::{
    ConversationSummary, FactKind, FactSource, HealthFact, RecentEvent, SymptomPattern,
};
pub use member::{EpisodeDigest, MemberHealthMemory, MemoryLimits, SessionSeed};
