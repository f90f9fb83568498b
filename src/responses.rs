//! Response bodies that are not plain domain records.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::BookingView;

/// Error and acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelBookingResponse {
    pub message: String,
    pub booking: BookingView,
}
