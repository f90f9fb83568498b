use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::booking::BookingError;
use crate::responses::MessageResponse;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate => ApiError::BadRequest("Record already exists".into()),
            StoreError::Conflict => ApiError::BadRequest(
                "The selected resources were booked concurrently, please try again".into(),
            ),
            StoreError::Database(err) => {
                error!("Database error: {err}");
                ApiError::Internal("Server error".into())
            }
            StoreError::Corrupt(msg) => {
                error!("Corrupt record: {msg}");
                ApiError::Internal("Server error".into())
            }
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::NotFound(msg) => ApiError::NotFound(msg),
            BookingError::Unavailable(msg) => ApiError::BadRequest(msg),
            BookingError::Forbidden => {
                ApiError::Forbidden("Not authorized to cancel this booking".into())
            }
            BookingError::Store(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}
