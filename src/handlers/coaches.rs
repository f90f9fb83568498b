use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use super::{BearerAuth, bearer};
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::models::Coach;
use crate::requests::CoachRequest;
use crate::responses::MessageResponse;
use crate::validation::{apply_coach_update, new_coach, parse_id};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/coaches",
    responses((status = 200, description = "Active coaches, newest first", body = [Coach])),
    tag = "coaches"
)]
pub async fn list_coaches(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_coaches(true).await?))
}

#[utoipa::path(
    get,
    path = "/coaches/{id}",
    params(("id" = String, Path, description = "Coach id")),
    responses(
        (status = 200, description = "Coach", body = Coach),
        (status = 400, description = "Invalid coach ID format", body = MessageResponse),
        (status = 404, description = "Coach not found", body = MessageResponse)
    ),
    tag = "coaches"
)]
pub async fn get_coach(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "coach")?;
    let coach = state
        .store
        .get_coach(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Coach not found".into()))?;
    Ok(Json(coach))
}

#[utoipa::path(
    post,
    path = "/admin/coaches",
    request_body = CoachRequest,
    responses(
        (status = 201, description = "Coach created", body = Coach),
        (status = 400, description = "Missing or invalid fields", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "coaches"
)]
pub async fn create_coach(
    State(state): State<AppState>,
    auth: BearerAuth,
    payload: Result<Json<CoachRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let Json(request) = payload?;

    let coach = new_coach(request, Utc::now())?;
    state.store.insert_coach(&coach).await?;
    info!(coach = %coach.id, name = %coach.name, "Coach created");
    Ok((StatusCode::CREATED, Json(coach)))
}

#[utoipa::path(
    patch,
    path = "/admin/coaches/{id}",
    params(("id" = String, Path, description = "Coach id")),
    request_body = CoachRequest,
    responses(
        (status = 200, description = "Updated coach", body = Coach),
        (status = 400, description = "Invalid id or fields", body = MessageResponse),
        (status = 404, description = "Coach not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "coaches"
)]
pub async fn update_coach(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
    payload: Result<Json<CoachRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "coach")?;
    let Json(request) = payload?;

    let not_found = || ApiError::NotFound("Coach not found".into());
    let mut coach = state.store.get_coach(id).await?.ok_or_else(not_found)?;
    apply_coach_update(&mut coach, request, Utc::now())?;
    if !state.store.update_coach(&coach).await? {
        return Err(not_found());
    }
    Ok(Json(coach))
}
