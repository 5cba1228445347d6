//! Application layer - the operations exposed to the app shell.
//!
//! `CareAssistant` orchestrates the domain and the ports. Read-only history
//! projections live in `queries`; record-level storage in `persistence`.

mod assistant;
mod errors;
pub mod persistence;
pub mod queries;
mod state;

pub use assistant::{ActionTaken, CareAssistant, Clock, SessionEnded, SessionStarted};
pub use errors::AssistantError;
pub use persistence::Persistence;
pub use state::AssistantState;
