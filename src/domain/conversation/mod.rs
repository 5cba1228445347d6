//! Conversation state machine.
//!
//! Phases, follow-up questions, messages and the per-turn engine that ties
//! red-flag detection, extraction, triage and guidance together.

pub mod engine;
pub mod extractor;
pub mod message;
pub mod phase;
pub mod question;
pub mod readiness;
pub mod state;

pub use engine::{ConversationEngine, TurnContext, TurnOutcome, GREETING};
pub use extractor::KeywordExtractor;
pub use message::{ContentType, Message, MessagePayload, Role};
pub use phase::ConversationPhase;
pub use question::FollowUpQuestionType;
pub use readiness::{MinimumContextPolicy, ReadinessPolicy};
pub use state::ConversationState;
