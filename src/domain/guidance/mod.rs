//! Guidance text and suggested actions.

pub mod actions;
pub mod copy_style;
pub mod generator;

pub use actions::{
    rank_actions, ActionUrgency, PrefilledData, SuggestedAction, SuggestedActionType,
};
pub use generator::{GuidanceGenerator, GuidanceResponse, DISCLAIMER};
