//! Domain layer containing the triage business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machines)
//! - `triage` - Health context, red flags, urgency and the triage engine
//! - `guidance` - Guidance text and ranked suggested actions
//! - `conversation` - Phases, follow-up questions and the turn engine
//! - `session` - Session aggregate, summary and exports
//! - `membership` - Trial and free-question access gate
//! - `memory` - Per-member health memory and candidates
//! - `feedback` - Message ratings and the feedback ledger

pub mod conversation;
pub mod feedback;
pub mod foundation;
pub mod guidance;
pub mod membership;
pub mod memory;
pub mod session;
pub mod triage;
