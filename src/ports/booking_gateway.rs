//! Booking gateway port.
//!
//! Hands a chosen suggested action to the service-booking side of the
//! platform and gets back the ids it created.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, MemberId, SessionId};
use crate::domain::guidance::{SuggestedAction, SuggestedActionType};

/// A booking request built from an action's prefilled data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub session_id: SessionId,
    pub member_id: MemberId,
    pub action_type: SuggestedActionType,
    pub service: String,
    pub suggested_date: Option<String>,
    pub duration: Option<String>,
    pub notes: String,
}

impl BookingRequest {
    /// Builds a request for a bookable action. Returns `None` for actions
    /// such as calling emergency services or monitoring at home.
    pub fn from_action(session_id: SessionId, action: &SuggestedAction) -> Option<Self> {
        let prefilled = action.prefilled_data.as_ref()?;
        let service = prefilled
            .service
            .clone()
            .or_else(|| action.action_type.service_name().map(str::to_string))?;
        Some(Self {
            session_id,
            member_id: prefilled.member_id.clone(),
            action_type: action.action_type,
            service,
            suggested_date: prefilled.suggested_date.clone(),
            duration: prefilled.duration.clone(),
            notes: prefilled.notes.clone(),
        })
    }
}

/// Ids created by the booking side. Equipment rentals produce orders,
/// everything else produces service requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub order_id: Option<String>,
    pub request_id: Option<String>,
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn submit(&self, request: BookingRequest) -> Result<BookingConfirmation, DomainError>;
}
