use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Json, response::IntoResponse};

use crate::booking::estimate_price;
use crate::error::ApiError;
use crate::models::PricingBreakdown;
use crate::requests::BookingRequest;
use crate::responses::MessageResponse;
use crate::validation::booking_draft;
use crate::AppState;

/// Prices a prospective booking with the current rules. Nothing is reserved.
#[utoipa::path(
    post,
    path = "/pricing/estimate",
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Price breakdown", body = PricingBreakdown),
        (status = 400, description = "Missing or invalid fields", body = MessageResponse),
        (status = 404, description = "Court not found", body = MessageResponse)
    ),
    tag = "pricing"
)]
pub async fn estimate(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let draft = booking_draft(request)?;
    let breakdown = estimate_price(state.store.as_ref(), state.settings.timezone, &draft).await?;
    Ok(Json(breakdown))
}
