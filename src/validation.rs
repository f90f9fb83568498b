use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::availability::TimeWindow;
use crate::booking::BookingDraft;
use crate::error::ApiError;
use crate::models::{
    AvailabilityWindow, Coach, Court, Equipment, EquipmentLine, PricingRule, RuleCondition,
    RuleKind,
};
use crate::requests::{
    BookingRequest, CoachRequest, CourtRequest, EquipmentRequest, PricingRuleRequest,
    RuleConditionRequest,
};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("regex compiles"));

const DEFAULT_RATING: f64 = 4.5;

/// Parses a path or body id; `label` names the resource in the message.
pub fn parse_id(raw: &str, label: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid {label} ID format")))
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::BadRequest("Invalid date format for startTime or endTime".into()))
}

/// Checks presence, formats and ordering. Duplicate equipment lines are
/// merged so each item is checked against stock once.
pub fn booking_draft(request: BookingRequest) -> Result<BookingDraft, ApiError> {
    let (Some(court_id), Some(start), Some(end)) = (
        non_blank(request.court_id),
        non_blank(request.start_time),
        non_blank(request.end_time),
    ) else {
        return Err(ApiError::BadRequest(
            "courtId, startTime, and endTime are required".into(),
        ));
    };

    let start = parse_timestamp(&start)?;
    let end = parse_timestamp(&end)?;
    let window = TimeWindow::new(start, end)
        .ok_or_else(|| ApiError::BadRequest("End time must be after start time".into()))?;

    let court_id = parse_id(&court_id, "court")?;
    let coach_id = non_blank(request.coach_id)
        .map(|raw| parse_id(&raw, "coach"))
        .transpose()?;

    let mut equipment: Vec<EquipmentLine> = Vec::with_capacity(request.equipment.len());
    for line in request.equipment {
        let equipment_id = line
            .equipment_id
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("Invalid equipment ID format".into()))
            .and_then(|raw| parse_id(raw, "equipment"))?;
        let quantity = line
            .quantity
            .filter(|q| *q >= 0)
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| {
                ApiError::BadRequest("Equipment quantity must be a non-negative number".into())
            })?;

        match equipment.iter_mut().find(|l| l.equipment_id == equipment_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => equipment.push(EquipmentLine {
                equipment_id,
                quantity,
            }),
        }
    }

    Ok(BookingDraft {
        court_id,
        window,
        coach_id,
        equipment,
    })
}

pub fn new_court(request: CourtRequest, now: DateTime<Utc>) -> Result<Court, ApiError> {
    let (Some(name), Some(court_type), Some(base_price)) =
        (non_blank(request.name), request.court_type, request.base_price)
    else {
        return Err(ApiError::BadRequest(
            "name, type, and basePrice are required".into(),
        ));
    };

    let mut court = Court {
        id: Uuid::new_v4(),
        name,
        image_url: String::new(),
        court_type,
        base_price: non_negative_money(base_price, "basePrice")?,
        rating: DEFAULT_RATING,
        rating_count: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    apply_court_update(
        &mut court,
        CourtRequest {
            image_url: request.image_url,
            rating: request.rating,
            rating_count: request.rating_count,
            is_active: request.is_active,
            ..Default::default()
        },
        now,
    )?;
    Ok(court)
}

pub fn apply_court_update(
    court: &mut Court,
    request: CourtRequest,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if let Some(name) = non_blank(request.name) {
        court.name = name;
    }
    if let Some(court_type) = request.court_type {
        court.court_type = court_type;
    }
    if let Some(base_price) = request.base_price {
        court.base_price = non_negative_money(base_price, "basePrice")?;
    }
    if let Some(image_url) = request.image_url {
        court.image_url = image_url;
    }
    if let Some(rating) = request.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(ApiError::BadRequest("rating must be between 0 and 5".into()));
        }
        court.rating = rating;
    }
    if let Some(count) = request.rating_count {
        court.rating_count = count_value(count, "ratingCount")?;
    }
    if let Some(is_active) = request.is_active {
        court.is_active = is_active;
    }
    court.updated_at = now;
    Ok(())
}

pub fn new_coach(request: CoachRequest, now: DateTime<Utc>) -> Result<Coach, ApiError> {
    let (Some(name), Some(hourly_rate)) = (non_blank(request.name), request.hourly_rate) else {
        return Err(ApiError::BadRequest("name and hourlyRate are required".into()));
    };

    let mut coach = Coach {
        id: Uuid::new_v4(),
        name,
        expertise: None,
        hourly_rate: non_negative_money(hourly_rate, "hourlyRate")?,
        availability: Vec::new(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    apply_coach_update(
        &mut coach,
        CoachRequest {
            expertise: request.expertise,
            availability: request.availability,
            is_active: request.is_active,
            ..Default::default()
        },
        now,
    )?;
    Ok(coach)
}

pub fn apply_coach_update(
    coach: &mut Coach,
    request: CoachRequest,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if let Some(name) = non_blank(request.name) {
        coach.name = name;
    }
    if let Some(expertise) = request.expertise {
        let expertise = expertise.trim().to_string();
        coach.expertise = (!expertise.is_empty()).then_some(expertise);
    }
    if let Some(hourly_rate) = request.hourly_rate {
        coach.hourly_rate = non_negative_money(hourly_rate, "hourlyRate")?;
    }
    if let Some(availability) = request.availability {
        coach.availability = availability_windows(availability)?;
    }
    if let Some(is_active) = request.is_active {
        coach.is_active = is_active;
    }
    coach.updated_at = now;
    Ok(())
}

fn availability_windows(
    windows: Vec<AvailabilityWindow>,
) -> Result<Vec<AvailabilityWindow>, ApiError> {
    for window in &windows {
        if window.day_of_week > 6 {
            return Err(ApiError::BadRequest(
                "dayOfWeek must be between 0 (Sunday) and 6 (Saturday)".into(),
            ));
        }
        if window.start_hour > 23 || window.end_hour > 23 {
            return Err(ApiError::BadRequest(
                "startHour and endHour must be between 0 and 23".into(),
            ));
        }
        if window.start_hour >= window.end_hour {
            return Err(ApiError::BadRequest(
                "startHour must be before endHour".into(),
            ));
        }
    }
    Ok(windows)
}

pub fn new_equipment(request: EquipmentRequest, now: DateTime<Utc>) -> Result<Equipment, ApiError> {
    let (Some(name), Some(total_stock), Some(per_unit_fee)) = (
        non_blank(request.name),
        request.total_stock,
        request.per_unit_fee,
    ) else {
        return Err(ApiError::BadRequest(
            "name, totalStock, and perUnitFee are required".into(),
        ));
    };

    Ok(Equipment {
        id: Uuid::new_v4(),
        name,
        total_stock: count_value(total_stock, "totalStock")?,
        per_unit_fee: non_negative_money(per_unit_fee, "perUnitFee")?,
        is_active: request.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_equipment_update(
    equipment: &mut Equipment,
    request: EquipmentRequest,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if let Some(name) = non_blank(request.name) {
        equipment.name = name;
    }
    if let Some(total_stock) = request.total_stock {
        equipment.total_stock = count_value(total_stock, "totalStock")?;
    }
    if let Some(per_unit_fee) = request.per_unit_fee {
        equipment.per_unit_fee = non_negative_money(per_unit_fee, "perUnitFee")?;
    }
    if let Some(is_active) = request.is_active {
        equipment.is_active = is_active;
    }
    equipment.updated_at = now;
    Ok(())
}

pub fn new_pricing_rule(
    request: PricingRuleRequest,
    now: DateTime<Utc>,
) -> Result<PricingRule, ApiError> {
    let (Some(name), Some(kind), Some(value)) =
        (non_blank(request.name), request.kind, request.value)
    else {
        return Err(ApiError::BadRequest(
            "name, type, and value are required".into(),
        ));
    };

    let rule = PricingRule {
        id: Uuid::new_v4(),
        name,
        kind,
        condition: request
            .condition
            .map(rule_condition)
            .transpose()?
            .unwrap_or_default(),
        value,
        is_active: request.is_active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };
    check_rule_value(&rule)?;
    Ok(rule)
}

pub fn apply_pricing_rule_update(
    rule: &mut PricingRule,
    request: PricingRuleRequest,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    if let Some(name) = non_blank(request.name) {
        rule.name = name;
    }
    if let Some(kind) = request.kind {
        rule.kind = kind;
    }
    if let Some(condition) = request.condition {
        rule.condition = rule_condition(condition)?;
    }
    if let Some(value) = request.value {
        rule.value = value;
    }
    if let Some(is_active) = request.is_active {
        rule.is_active = is_active;
    }
    check_rule_value(rule)?;
    rule.updated_at = now;
    Ok(())
}

fn check_rule_value(rule: &PricingRule) -> Result<(), ApiError> {
    if rule.kind == RuleKind::Multiplier && rule.value <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "Multiplier value must be greater than 0".into(),
        ));
    }
    Ok(())
}

pub fn parse_rule_date(raw: &str) -> Result<NaiveDate, ApiError> {
    let invalid = || ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD.".into());
    if !DATE_RE.is_match(raw) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

fn rule_condition(request: RuleConditionRequest) -> Result<RuleCondition, ApiError> {
    if request.day_of_week.iter().any(|d| *d > 6) {
        return Err(ApiError::BadRequest(
            "dayOfWeek must be between 0 (Sunday) and 6 (Saturday)".into(),
        ));
    }

    match (request.start_hour, request.end_hour) {
        (Some(start), Some(end)) => {
            if start > 23 || end > 24 {
                return Err(ApiError::BadRequest(
                    "startHour must be 0-23 and endHour 1-24".into(),
                ));
            }
            if start >= end {
                return Err(ApiError::BadRequest(
                    "startHour must be before endHour".into(),
                ));
            }
        }
        (None, None) => {}
        _ => {
            return Err(ApiError::BadRequest(
                "startHour and endHour must be provided together".into(),
            ));
        }
    }

    let date = non_blank(request.date)
        .map(|raw| parse_rule_date(&raw))
        .transpose()?;

    let mut day_of_week = request.day_of_week;
    day_of_week.sort_unstable();
    day_of_week.dedup();

    Ok(RuleCondition {
        day_of_week,
        start_hour: request.start_hour,
        end_hour: request.end_hour,
        date,
        court_types: request.court_types,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_negative_money(value: Decimal, field: &str) -> Result<Decimal, ApiError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ApiError::BadRequest(format!("{field} must be non-negative")))
    } else {
        Ok(value)
    }
}

/// Counts are stored in 32-bit signed columns.
const MAX_COUNT: i64 = i32::MAX as i64;

fn count_value(value: i64, field: &str) -> Result<u32, ApiError> {
    if !(0..=MAX_COUNT).contains(&value) {
        return Err(ApiError::BadRequest(format!(
            "{field} must be an integer between 0 and {MAX_COUNT}"
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::CourtType;
    use crate::requests::EquipmentLineRequest;

    fn request(court: &str, start: &str, end: &str) -> BookingRequest {
        BookingRequest {
            court_id: Some(court.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            ..Default::default()
        }
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest(msg) => msg,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    const COURT: &str = "6f1c1f52-4b55-4a40-9d0a-4e1f6a4e8b11";
    const RACKET: &str = "0b8a4c1e-2c57-4bfb-8a53-7d9c7a3e1f20";

    #[test]
    fn test_booking_requires_fields() {
        let err = booking_draft(BookingRequest::default()).unwrap_err();
        assert_eq!(message(err), "courtId, startTime, and endTime are required");

        let err = booking_draft(request(COURT, "  ", "2025-03-05T11:00:00Z")).unwrap_err();
        assert_eq!(message(err), "courtId, startTime, and endTime are required");
    }

    #[test]
    fn test_booking_checks_dates_and_order() {
        let err = booking_draft(request(COURT, "yesterday", "2025-03-05T11:00:00Z")).unwrap_err();
        assert_eq!(message(err), "Invalid date format for startTime or endTime");

        let err = booking_draft(request(
            COURT,
            "2025-03-05T11:00:00Z",
            "2025-03-05T11:00:00Z",
        ))
        .unwrap_err();
        assert_eq!(message(err), "End time must be after start time");
    }

    #[test]
    fn test_booking_checks_id_formats() {
        let err = booking_draft(request(
            "not-an-id",
            "2025-03-05T10:00:00Z",
            "2025-03-05T11:00:00Z",
        ))
        .unwrap_err();
        assert_eq!(message(err), "Invalid court ID format");

        let mut req = request(COURT, "2025-03-05T10:00:00Z", "2025-03-05T11:00:00Z");
        req.coach_id = Some("42".to_string());
        assert_eq!(message(booking_draft(req).unwrap_err()), "Invalid coach ID format");
    }

    #[test]
    fn test_booking_offsets_are_normalized_to_utc() {
        let draft = booking_draft(request(
            COURT,
            "2025-03-05T15:30:00+05:30",
            "2025-03-05T16:30:00+05:30",
        ))
        .unwrap();
        assert_eq!(draft.window.start().to_rfc3339(), "2025-03-05T10:00:00+00:00");
    }

    #[test]
    fn test_booking_equipment_lines() {
        let mut req = request(COURT, "2025-03-05T10:00:00Z", "2025-03-05T11:00:00Z");
        req.equipment = vec![
            EquipmentLineRequest {
                equipment_id: Some(RACKET.to_string()),
                quantity: Some(2),
            },
            EquipmentLineRequest {
                equipment_id: Some(RACKET.to_string()),
                quantity: Some(1),
            },
        ];
        let draft = booking_draft(req).unwrap();
        assert_eq!(draft.equipment.len(), 1);
        assert_eq!(draft.equipment[0].quantity, 3);

        let mut req = request(COURT, "2025-03-05T10:00:00Z", "2025-03-05T11:00:00Z");
        req.equipment = vec![EquipmentLineRequest {
            equipment_id: Some(RACKET.to_string()),
            quantity: Some(-1),
        }];
        assert_eq!(
            message(booking_draft(req).unwrap_err()),
            "Equipment quantity must be a non-negative number"
        );
    }

    #[test]
    fn test_new_court_defaults() {
        let court = new_court(
            CourtRequest {
                name: Some("  Vega Badminton Arena ".to_string()),
                court_type: Some(CourtType::Indoor),
                base_price: Some(dec!(450)),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(court.name, "Vega Badminton Arena");
        assert_eq!(court.rating, 4.5);
        assert!(court.is_active);
    }

    #[test]
    fn test_equipment_stock_fits_a_32_bit_column() {
        let equipment = |stock: i64| EquipmentRequest {
            name: Some("Shuttlecock tube".to_string()),
            total_stock: Some(stock),
            per_unit_fee: Some(dec!(60)),
            ..Default::default()
        };
        let max = i64::from(i32::MAX);

        let created = new_equipment(equipment(max), Utc::now()).unwrap();
        assert_eq!(created.total_stock, i32::MAX as u32);

        let err = new_equipment(equipment(max + 1), Utc::now()).unwrap_err();
        assert_eq!(message(err), "totalStock must be an integer between 0 and 2147483647");
        assert!(new_equipment(equipment(-1), Utc::now()).is_err());

        let mut existing = created;
        let err = apply_equipment_update(&mut existing, equipment(u32::MAX.into()), Utc::now())
            .unwrap_err();
        assert!(message(err).starts_with("totalStock"));
        assert_eq!(existing.total_stock, i32::MAX as u32);
    }

    #[test]
    fn test_court_update_rejects_negative_price_and_ignores_empty_name() {
        let mut court = new_court(
            CourtRequest {
                name: Some("SBM Sports Club".to_string()),
                court_type: Some(CourtType::Outdoor),
                base_price: Some(dec!(200)),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        apply_court_update(
            &mut court,
            CourtRequest {
                name: Some(String::new()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(court.name, "SBM Sports Club");

        let err = apply_court_update(
            &mut court,
            CourtRequest {
                base_price: Some(dec!(-1)),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(message(err), "basePrice must be non-negative");
    }

    #[test]
    fn test_coach_availability_validation() {
        let err = new_coach(
            CoachRequest {
                name: Some("Coach Neha".to_string()),
                hourly_rate: Some(dec!(220)),
                availability: Some(vec![AvailabilityWindow {
                    day_of_week: 7,
                    start_hour: 6,
                    end_hour: 22,
                }]),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(message(err).starts_with("dayOfWeek"));
    }

    #[test]
    fn test_rule_date_format() {
        assert!(parse_rule_date("2025-12-25").is_ok());
        assert!(parse_rule_date("2025-12-5").is_err());
        assert!(parse_rule_date("2025-02-30").is_err());
    }

    #[test]
    fn test_new_pricing_rule_condition() {
        let rule = new_pricing_rule(
            PricingRuleRequest {
                name: Some("Weekend Surcharge".to_string()),
                kind: Some(RuleKind::Fixed),
                value: Some(dec!(80)),
                condition: Some(RuleConditionRequest {
                    day_of_week: vec![6, 0, 6],
                    date: Some(String::new()),
                    ..Default::default()
                }),
                is_active: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(rule.condition.day_of_week, vec![0, 6]);
        assert!(rule.condition.date.is_none());
        assert!(rule.is_active);

        let err = new_pricing_rule(
            PricingRuleRequest {
                name: Some("Evening Peak".to_string()),
                kind: Some(RuleKind::Multiplier),
                value: Some(dec!(1.5)),
                condition: Some(RuleConditionRequest {
                    start_hour: Some(18),
                    ..Default::default()
                }),
                is_active: None,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(message(err), "startHour and endHour must be provided together");
    }
}
