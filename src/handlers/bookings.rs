use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode, response::IntoResponse};

use super::{BearerAuth, bearer};
use crate::auth::{authenticate, require_admin};
use crate::booking::{cancel_booking as cancel, create_booking as create, populate, populate_all};
use crate::error::ApiError;
use crate::models::BookingView;
use crate::requests::BookingRequest;
use crate::responses::{CancelBookingResponse, MessageResponse};
use crate::validation::{booking_draft, parse_id};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = BookingView),
        (status = 400, description = "Invalid request or resources unavailable", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "Court, coach or equipment not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    auth: BearerAuth,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state.settings, bearer(auth))?;
    let Json(request) = payload?;
    let draft = booking_draft(request)?;

    let store = state.store.as_ref();
    let booking = create(store, state.settings.timezone, &principal, draft).await?;
    let view = populate(store, booking).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/bookings/user",
    responses(
        (status = 200, description = "The caller's bookings, latest first", body = [BookingView]),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn user_bookings(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state.settings, bearer(auth))?;
    let store = state.store.as_ref();
    let bookings = store.list_bookings(Some(principal.user_id)).await?;
    Ok(Json(populate_all(store, bookings).await?))
}

#[utoipa::path(
    get,
    path = "/bookings/admin",
    responses(
        (status = 200, description = "All bookings, latest first", body = [BookingView]),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn all_bookings(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let store = state.store.as_ref();
    let bookings = store.list_bookings(None).await?;
    Ok(Json(populate_all(store, bookings).await?))
}

#[utoipa::path(
    patch,
    path = "/bookings/{id}/cancel",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = CancelBookingResponse),
        (status = 400, description = "Invalid booking ID format", body = MessageResponse),
        (status = 403, description = "Not the owner", body = MessageResponse),
        (status = 404, description = "Booking not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authenticate(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "booking")?;

    let store = state.store.as_ref();
    let booking = cancel(store, &principal, id).await?;
    Ok(Json(CancelBookingResponse {
        message: "Booking cancelled successfully".into(),
        booking: populate(store, booking).await?,
    }))
}
