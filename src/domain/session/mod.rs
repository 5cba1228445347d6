//! Session domain module.
//!
//! One Ask CareBow session: the message log, conversation state, triage
//! outcome, and the summary and exports produced from them.

mod aggregate;
mod errors;
pub mod export;
pub mod summary;

pub use aggregate::AskCarebowSession;
pub use errors::SessionError;
pub use export::{
    build_export, export_json, export_text, ExportFormat, ExportRecord, SessionExport,
    EXPORT_VERSION,
};
pub use summary::{generate_session_summary, SessionSummary, NOT_SPECIFIED};
