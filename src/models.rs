use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourtType {
    Indoor,
    Outdoor,
}

impl CourtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtType::Indoor => "indoor",
            CourtType::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for CourtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourtType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indoor" => Ok(CourtType::Indoor),
            "outdoor" => Ok(CourtType::Outdoor),
            other => Err(format!("unknown court type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "type")]
    pub court_type: CourtType,
    /// Price per hour before any pricing rule is applied.
    #[schema(example = 350)]
    pub base_price: Decimal,
    #[schema(example = 4.5)]
    pub rating: f64,
    pub rating_count: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One weekly slot in which a coach takes bookings.
///
/// `day_of_week` counts from Sunday (0) to Saturday (6); hours are whole
/// hours in facility time and the slot ends at `end_hour:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub day_of_week: u8,
    pub start_hour: u8,
    pub end_hour: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: Uuid,
    pub name: String,
    pub expertise: Option<String>,
    #[schema(example = 150)]
    pub hourly_rate: Decimal,
    pub availability: Vec<AvailabilityWindow>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub total_stock: u32,
    #[schema(example = 30)]
    pub per_unit_fee: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Adds `value` to the peak or weekend fee.
    Fixed,
    /// Scales the running base price by `value`.
    Multiplier,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Fixed => "fixed",
            RuleKind::Multiplier => "multiplier",
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(RuleKind::Fixed),
            "multiplier" => Ok(RuleKind::Multiplier),
            other => Err(format!("unknown pricing rule type `{other}`")),
        }
    }
}

/// Conditions a booking must satisfy for a pricing rule to apply.
///
/// Empty sets and absent fields are not conditions at all. The hour range
/// only counts when both bounds are present and matches the start hour
/// half-open: `start_hour <= hour < end_hour`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub day_of_week: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_hour: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Date, example = "2025-12-25")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub court_types: Vec<CourtType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub condition: RuleCondition,
    #[schema(example = 1.5)]
    pub value: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentLine {
    pub equipment_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResources {
    #[serde(default)]
    pub equipment: Vec<EquipmentLine>,
    pub coach_id: Option<Uuid>,
}

impl BookingResources {
    pub fn quantity_of(&self, equipment_id: Uuid) -> u32 {
        self.equipment
            .iter()
            .filter(|line| line.equipment_id == equipment_id)
            .map(|line| line.quantity)
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub base_price: Decimal,
    pub peak_fee: Decimal,
    pub weekend_fee: Decimal,
    pub equipment_fee: Decimal,
    pub coach_fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub court_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub resources: BookingResources,
    pub pricing_breakdown: PricingBreakdown,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourtSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub court_type: CourtType,
    pub base_price: Decimal,
}

impl From<&Court> for CourtSummary {
    fn from(court: &Court) -> Self {
        Self {
            id: court.id,
            name: court.name.clone(),
            court_type: court.court_type,
            base_price: court.base_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoachSummary {
    pub id: Uuid,
    pub name: String,
    pub expertise: Option<String>,
    pub hourly_rate: Decimal,
}

impl From<&Coach> for CoachSummary {
    fn from(coach: &Coach) -> Self {
        Self {
            id: coach.id,
            name: coach.name.clone(),
            expertise: coach.expertise.clone(),
            hourly_rate: coach.hourly_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSummary {
    pub id: Uuid,
    pub name: String,
    pub per_unit_fee: Decimal,
    pub quantity: u32,
}

/// A booking with the court, coach and equipment it references resolved.
///
/// References to records that no longer exist are left out.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub court: Option<CourtSummary>,
    pub coach: Option<CoachSummary>,
    pub equipment: Vec<EquipmentSummary>,
}
