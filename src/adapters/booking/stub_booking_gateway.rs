//! Stub implementation of BookingGateway for development and testing.
//!
//! Records every request it receives and hands back generated ids.
//! Replace with an adapter for the real booking service in production.
//!
//! # Usage
//!
//! ```ignore
//! use carebow_triage::adapters::booking::StubBookingGateway;
//!
//! let gateway = StubBookingGateway::new();
//! // Or one that fails every submission:
//! let gateway = StubBookingGateway::failing();
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::guidance::SuggestedActionType;
use crate::ports::{BookingConfirmation, BookingGateway, BookingRequest};

/// Stub BookingGateway that accepts every request.
#[derive(Debug, Clone, Default)]
pub struct StubBookingGateway {
    submitted: Arc<RwLock<Vec<BookingRequest>>>,
    fail: bool,
}

impl StubBookingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stub that rejects all submissions (for testing failure flows).
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests received so far, oldest first.
    pub async fn submitted(&self) -> Vec<BookingRequest> {
        self.submitted.read().await.clone()
    }
}

#[async_trait]
impl BookingGateway for StubBookingGateway {
    async fn submit(&self, request: BookingRequest) -> Result<BookingConfirmation, DomainError> {
        if self.fail {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Booking service unavailable",
            )
            .with_detail("service", request.service));
        }

        let id = Uuid::new_v4().simple().to_string();
        let confirmation = if request.action_type == SuggestedActionType::RentEquipment {
            BookingConfirmation {
                order_id: Some(format!("order-{id}")),
                request_id: None,
            }
        } else {
            BookingConfirmation {
                order_id: None,
                request_id: Some(format!("req-{id}")),
            }
        };
        self.submitted.write().await.push(request);
        Ok(confirmation)
    }
}
