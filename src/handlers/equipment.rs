use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use super::{BearerAuth, bearer};
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::models::Equipment;
use crate::requests::EquipmentRequest;
use crate::responses::MessageResponse;
use crate::store::StoreError;
use crate::validation::{apply_equipment_update, new_equipment, parse_id};
use crate::AppState;

fn duplicate_name(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate => {
            ApiError::BadRequest("Equipment with this name already exists".into())
        }
        other => other.into(),
    }
}

#[utoipa::path(
    get,
    path = "/equipment",
    responses((status = 200, description = "Active equipment, newest first", body = [Equipment])),
    tag = "equipment"
)]
pub async fn list_equipment(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_equipment(true).await?))
}

#[utoipa::path(
    get,
    path = "/equipment/{id}",
    params(("id" = String, Path, description = "Equipment id")),
    responses(
        (status = 200, description = "Equipment item", body = Equipment),
        (status = 400, description = "Invalid equipment ID format", body = MessageResponse),
        (status = 404, description = "Equipment not found", body = MessageResponse)
    ),
    tag = "equipment"
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "equipment")?;
    let item = state
        .store
        .get_equipment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Equipment not found".into()))?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/admin/equipment",
    request_body = EquipmentRequest,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Missing fields or duplicate name", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    auth: BearerAuth,
    payload: Result<Json<EquipmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let Json(request) = payload?;

    let item = new_equipment(request, Utc::now())?;
    state
        .store
        .insert_equipment(&item)
        .await
        .map_err(duplicate_name)?;
    info!(equipment = %item.id, name = %item.name, stock = item.total_stock, "Equipment created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    patch,
    path = "/admin/equipment/{id}",
    params(("id" = String, Path, description = "Equipment id")),
    request_body = EquipmentRequest,
    responses(
        (status = 200, description = "Updated equipment", body = Equipment),
        (status = 400, description = "Invalid id, fields or duplicate name", body = MessageResponse),
        (status = 404, description = "Equipment not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "equipment"
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
    payload: Result<Json<EquipmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "equipment")?;
    let Json(request) = payload?;

    let not_found = || ApiError::NotFound("Equipment not found".into());
    let mut item = state.store.get_equipment(id).await?.ok_or_else(not_found)?;
    apply_equipment_update(&mut item, request, Utc::now())?;
    if !state
        .store
        .update_equipment(&item)
        .await
        .map_err(duplicate_name)?
    {
        return Err(not_found());
    }
    Ok(Json(item))
}
