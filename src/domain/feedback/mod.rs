//! Feedback on assistant messages.

pub mod ledger;

pub use ledger::{
    snippet, FeedbackEntry, FeedbackError, FeedbackLedger, FeedbackRating, FeedbackReason,
    FeedbackSubmission, FeedbackSummary, ReasonBreakdown, SNIPPET_LENGTH,
};
