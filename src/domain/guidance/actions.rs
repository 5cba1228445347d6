//! Suggested actions and their ranking.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::domain::foundation::MemberId;

/// Closed set of things the assistant can suggest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedActionType {
    BookDoctor,
    RequestNurse,
    RentEquipment,
    BookLabTest,
    VideoConsult,
    CallEmergency,
    MonitorAtHome,
    NoActionNeeded,
}

impl SuggestedActionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BookDoctor => "Book a doctor visit",
            Self::RequestNurse => "Request a nurse",
            Self::RentEquipment => "Rent medical equipment",
            Self::BookLabTest => "Book a lab test",
            Self::VideoConsult => "Start a video consult",
            Self::CallEmergency => "Call emergency services",
            Self::MonitorAtHome => "Monitor at home",
            Self::NoActionNeeded => "No action needed",
        }
    }

    /// Bookable service behind this action, if any.
    pub fn service_name(&self) -> Option<&'static str> {
        match self {
            Self::BookDoctor => Some("Doctor home visit"),
            Self::RequestNurse => Some("Nurse home visit"),
            Self::RentEquipment => Some("Medical equipment rental"),
            Self::BookLabTest => Some("Lab test at home"),
            Self::VideoConsult => Some("Video consultation"),
            Self::CallEmergency | Self::MonitorAtHome | Self::NoActionNeeded => None,
        }
    }

    /// Typical booking length.
    pub fn default_duration(&self) -> Option<&'static str> {
        match self {
            Self::BookDoctor | Self::BookLabTest => Some("30 minutes"),
            Self::VideoConsult => Some("15 minutes"),
            Self::RequestNurse => Some("60 minutes"),
            Self::RentEquipment => Some("7 days"),
            _ => None,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.service_name().is_some()
    }
}

/// How soon an action should be taken. Ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionUrgency {
    Low,
    Routine,
    Soon,
    High,
    Immediate,
}

/// Data handed to the booking collaborator to pre-populate a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefilledData {
    pub member_id: MemberId,
    pub service: Option<String>,
    pub suggested_date: Option<String>,
    pub duration: Option<String>,
    pub notes: String,
}

/// One ranked suggestion shown under the guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub action_type: SuggestedActionType,
    pub label: String,
    pub description: String,
    pub urgency: ActionUrgency,
    pub prefilled_data: Option<PrefilledData>,
}

impl SuggestedAction {
    pub fn new(
        action_type: SuggestedActionType,
        description: impl Into<String>,
        urgency: ActionUrgency,
    ) -> Self {
        Self {
            action_type,
            label: action_type.label().to_string(),
            description: description.into(),
            urgency,
            prefilled_data: None,
        }
    }

    pub fn with_prefilled(mut self, data: PrefilledData) -> Self {
        self.prefilled_data = Some(data);
        self
    }
}

/// Orders actions for display.
///
/// `call_emergency` always comes first, then descending urgency. Ties keep
/// the order in which the actions were introduced. Duplicate types keep
/// their first occurrence.
pub fn rank_actions(actions: Vec<SuggestedAction>) -> Vec<SuggestedAction> {
    let mut unique: Vec<SuggestedAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if !unique.iter().any(|a| a.action_type == action.action_type) {
            unique.push(action);
        }
    }
    unique.sort_by_key(|a| {
        (
            a.action_type != SuggestedActionType::CallEmergency,
            Reverse(a.urgency),
        )
    });
    unique
}
