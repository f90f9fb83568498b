//! Request bodies as clients send them.
//!
//! Fields are loosely typed so that missing or malformed values can be
//! reported with a specific message; `validation` turns them into domain
//! records.

use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{AvailabilityWindow, CourtType, RuleKind};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub court_id: Option<String>,
    /// RFC 3339 timestamp.
    #[schema(example = "2025-03-05T10:00:00Z")]
    pub start_time: Option<String>,
    #[schema(example = "2025-03-05T11:00:00Z")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub equipment: Vec<EquipmentLineRequest>,
    pub coach_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentLineRequest {
    pub equipment_id: Option<String>,
    pub quantity: Option<i64>,
}

/// Create and partial update share one body; on update only present fields
/// change.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourtRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub court_type: Option<CourtType>,
    pub base_price: Option<Decimal>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoachRequest {
    pub name: Option<String>,
    pub expertise: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub availability: Option<Vec<AvailabilityWindow>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRequest {
    pub name: Option<String>,
    pub total_stock: Option<i64>,
    pub per_unit_fee: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditionRequest {
    #[serde(default)]
    pub day_of_week: Vec<u8>,
    pub start_hour: Option<u8>,
    pub end_hour: Option<u8>,
    /// `YYYY-MM-DD`; an empty string means no date.
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub court_types: Vec<CourtType>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRuleRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<RuleKind>,
    pub condition: Option<RuleConditionRequest>,
    pub value: Option<Decimal>,
    pub is_active: Option<bool>,
}
