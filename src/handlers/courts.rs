use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use super::{BearerAuth, bearer};
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::models::Court;
use crate::requests::CourtRequest;
use crate::responses::MessageResponse;
use crate::validation::{apply_court_update, new_court, parse_id};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/courts",
    responses((status = 200, description = "Active courts, newest first", body = [Court])),
    tag = "courts"
)]
pub async fn list_courts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_courts(true).await?))
}

#[utoipa::path(
    get,
    path = "/courts/{id}",
    params(("id" = String, Path, description = "Court id")),
    responses(
        (status = 200, description = "Court", body = Court),
        (status = 400, description = "Invalid court ID format", body = MessageResponse),
        (status = 404, description = "Court not found", body = MessageResponse)
    ),
    tag = "courts"
)]
pub async fn get_court(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "court")?;
    let court = state
        .store
        .get_court(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Court not found".into()))?;
    Ok(Json(court))
}

#[utoipa::path(
    get,
    path = "/admin/courts",
    responses(
        (status = 200, description = "All courts including inactive ones", body = [Court]),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "courts"
)]
pub async fn list_all_courts(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    Ok(Json(state.store.list_courts(false).await?))
}

#[utoipa::path(
    post,
    path = "/admin/courts",
    request_body = CourtRequest,
    responses(
        (status = 201, description = "Court created", body = Court),
        (status = 400, description = "Missing or invalid fields", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "courts"
)]
pub async fn create_court(
    State(state): State<AppState>,
    auth: BearerAuth,
    payload: Result<Json<CourtRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let Json(request) = payload?;

    let court = new_court(request, Utc::now())?;
    state.store.insert_court(&court).await?;
    info!(court = %court.id, name = %court.name, "Court created");
    Ok((StatusCode::CREATED, Json(court)))
}

#[utoipa::path(
    patch,
    path = "/admin/courts/{id}",
    params(("id" = String, Path, description = "Court id")),
    request_body = CourtRequest,
    responses(
        (status = 200, description = "Updated court", body = Court),
        (status = 400, description = "Invalid id or fields", body = MessageResponse),
        (status = 404, description = "Court not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "courts"
)]
pub async fn update_court(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
    payload: Result<Json<CourtRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "court")?;
    let Json(request) = payload?;

    let not_found = || ApiError::NotFound("Court not found".into());
    let mut court = state.store.get_court(id).await?.ok_or_else(not_found)?;
    apply_court_update(&mut court, request, Utc::now())?;
    if !state.store.update_court(&court).await? {
        return Err(not_found());
    }
    Ok(Json(court))
}

#[utoipa::path(
    delete,
    path = "/admin/courts/{id}",
    params(("id" = String, Path, description = "Court id")),
    responses(
        (status = 200, description = "Court deleted", body = MessageResponse),
        (status = 404, description = "Court not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "courts"
)]
pub async fn delete_court(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "court")?;

    if !state.store.delete_court(id).await? {
        return Err(ApiError::NotFound("Court not found".into()));
    }
    info!(court = %id, "Court deleted");
    Ok(Json(MessageResponse::new("Court deleted successfully")))
}
