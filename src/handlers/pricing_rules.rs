use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use tracing::info;

use super::{BearerAuth, bearer};
use crate::auth::require_admin;
use crate::error::ApiError;
use crate::models::PricingRule;
use crate::requests::PricingRuleRequest;
use crate::responses::MessageResponse;
use crate::store::{Store, StoreError};
use crate::validation::{apply_pricing_rule_update, new_pricing_rule, parse_id};
use crate::AppState;

const DUPLICATE_DATE: &str = "A holiday rule already exists for this date.";

fn duplicate_date(err: StoreError) -> ApiError {
    match err {
        StoreError::Duplicate => ApiError::BadRequest(DUPLICATE_DATE.into()),
        other => other.into(),
    }
}

/// At most one rule may target a given calendar date.
async fn ensure_date_free(store: &dyn Store, rule: &PricingRule) -> Result<(), ApiError> {
    let Some(date) = rule.condition.date else {
        return Ok(());
    };
    if store
        .find_pricing_rule_by_date(date, Some(rule.id))
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(DUPLICATE_DATE.into()));
    }
    Ok(())
}

/// Every rule, inactive ones included, so a disabled rule can be found and
/// re-enabled.
#[utoipa::path(
    get,
    path = "/pricing-rules",
    responses((status = 200, description = "All pricing rules, newest first", body = [PricingRule])),
    tag = "pricing"
)]
pub async fn list_pricing_rules(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_pricing_rules().await?))
}

#[utoipa::path(
    get,
    path = "/pricing-rules/{id}",
    params(("id" = String, Path, description = "Pricing rule id")),
    responses(
        (status = 200, description = "Pricing rule", body = PricingRule),
        (status = 400, description = "Invalid pricing rule ID format", body = MessageResponse),
        (status = 404, description = "Pricing rule not found", body = MessageResponse)
    ),
    tag = "pricing"
)]
pub async fn get_pricing_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "pricing rule")?;
    let rule = state
        .store
        .get_pricing_rule(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pricing rule not found".into()))?;
    Ok(Json(rule))
}

#[utoipa::path(
    post,
    path = "/admin/pricing-rules",
    request_body = PricingRuleRequest,
    responses(
        (status = 201, description = "Pricing rule created", body = PricingRule),
        (status = 400, description = "Missing fields, bad date or duplicate date", body = MessageResponse),
        (status = 403, description = "Admin only", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pricing"
)]
pub async fn create_pricing_rule(
    State(state): State<AppState>,
    auth: BearerAuth,
    payload: Result<Json<PricingRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let Json(request) = payload?;

    let rule = new_pricing_rule(request, Utc::now())?;
    ensure_date_free(state.store.as_ref(), &rule).await?;
    state
        .store
        .insert_pricing_rule(&rule)
        .await
        .map_err(duplicate_date)?;
    info!(rule = %rule.id, name = %rule.name, kind = rule.kind.as_str(), "Pricing rule created");
    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    patch,
    path = "/admin/pricing-rules/{id}",
    params(("id" = String, Path, description = "Pricing rule id")),
    request_body = PricingRuleRequest,
    responses(
        (status = 200, description = "Updated pricing rule", body = PricingRule),
        (status = 400, description = "Invalid id, fields or duplicate date", body = MessageResponse),
        (status = 404, description = "Pricing rule not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pricing"
)]
pub async fn update_pricing_rule(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
    payload: Result<Json<PricingRuleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "pricing rule")?;
    let Json(request) = payload?;

    let not_found = || ApiError::NotFound("Pricing rule not found".into());
    let mut rule = state.store.get_pricing_rule(id).await?.ok_or_else(not_found)?;
    apply_pricing_rule_update(&mut rule, request, Utc::now())?;
    ensure_date_free(state.store.as_ref(), &rule).await?;
    if !state
        .store
        .update_pricing_rule(&rule)
        .await
        .map_err(duplicate_date)?
    {
        return Err(not_found());
    }
    Ok(Json(rule))
}

#[utoipa::path(
    delete,
    path = "/admin/pricing-rules/{id}",
    params(("id" = String, Path, description = "Pricing rule id")),
    responses(
        (status = 200, description = "Pricing rule deleted", body = MessageResponse),
        (status = 404, description = "Pricing rule not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "pricing"
)]
pub async fn delete_pricing_rule(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state.settings, bearer(auth))?;
    let id = parse_id(&id, "pricing rule")?;

    if !state.store.delete_pricing_rule(id).await? {
        return Err(ApiError::NotFound("Pricing rule not found".into()));
    }
    info!(rule = %id, "Pricing rule deleted");
    Ok(Json(MessageResponse::new("Pricing rule deleted successfully")))
}
