pub mod bookings;
pub mod coaches;
pub mod courts;
pub mod equipment;
pub mod pricing;
pub mod pricing_rules;

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Optional bearer header; handlers decide whether it is required.
pub(crate) type BearerAuth = Option<TypedHeader<Authorization<Bearer>>>;

pub(crate) fn bearer(auth: BearerAuth) -> Option<Authorization<Bearer>> {
    auth.map(|TypedHeader(a)| a)
}

#[utoipa::path(get, path = "/", tag = "health")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Court Booking API",
        "endpoints": {
            "/courts": "Browse courts",
            "/coaches": "Browse coaches",
            "/equipment": "Browse rentable equipment",
            "/pricing-rules": "Current pricing rules",
            "/pricing/estimate": "Price a booking without reserving it",
            "/bookings": "Create and manage bookings"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "health")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Store is reachable"),
        (status = 503, description = "Store is unreachable")
    ),
    tag = "health"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.store.ping().await.map_err(|err| {
        warn!("Readiness check failed: {err}");
        ApiError::Unavailable("Store is unreachable".into())
    })?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}
