use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::availability::TimeWindow;
use crate::models::{
    Coach, Court, CourtType, Equipment, PricingBreakdown, PricingRule, RuleCondition, RuleKind,
};

/// Everything the engine needs to price one booking window.
pub struct PricingInput<'a> {
    pub court: &'a Court,
    pub window: TimeWindow,
    pub coach: Option<&'a Coach>,
    pub equipment: Vec<(&'a Equipment, u32)>,
}

/// Round to cents using banker's rounding.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Whether every condition present on the rule holds for a booking on a
/// court of `court_type` starting at `local` (facility time).
pub fn rule_applies(condition: &RuleCondition, court_type: CourtType, local: &DateTime<Tz>) -> bool {
    if !condition.court_types.is_empty() && !condition.court_types.contains(&court_type) {
        return false;
    }

    if let Some(date) = condition.date {
        if date != local.date_naive() {
            return false;
        }
    }

    if !condition.day_of_week.is_empty() {
        let day = local.weekday().num_days_from_sunday();
        if !condition.day_of_week.iter().any(|d| u32::from(*d) == day) {
            return false;
        }
    }

    if let (Some(start), Some(end)) = (condition.start_hour, condition.end_hour) {
        let hour = local.hour();
        if hour < u32::from(start) || hour >= u32::from(end) {
            return false;
        }
    }

    true
}

/// Fixed amounts from rules aimed at Saturday/Sunday or a specific date are
/// booked as the weekend fee; everything else is a peak fee.
pub fn is_weekend_rule(condition: &RuleCondition) -> bool {
    condition.date.is_some() || condition.day_of_week.iter().any(|d| *d == 0 || *d == 6)
}

/// Applies active rules in the given order to the court's base rate and adds
/// equipment and coach fees.
///
/// Components are rounded to cents individually and the total is their sum,
/// so `total == base + peak + weekend + equipment + coach` holds exactly.
pub fn calculate(input: &PricingInput<'_>, rules: &[PricingRule], tz: Tz) -> PricingBreakdown {
    let hours = input.window.duration_hours();
    let local = input.window.start().with_timezone(&tz);

    let mut base_price = input.court.base_price * hours;
    let mut peak_fee = Decimal::ZERO;
    let mut weekend_fee = Decimal::ZERO;

    for rule in rules.iter().filter(|r| r.is_active) {
        if !rule_applies(&rule.condition, input.court.court_type, &local) {
            continue;
        }
        match rule.kind {
            RuleKind::Multiplier => base_price *= rule.value,
            RuleKind::Fixed if is_weekend_rule(&rule.condition) => weekend_fee += rule.value,
            RuleKind::Fixed => peak_fee += rule.value,
        }
    }

    let equipment_fee: Decimal = input
        .equipment
        .iter()
        .map(|(item, quantity)| item.per_unit_fee * Decimal::from(*quantity))
        .sum();

    let coach_fee = input
        .coach
        .map(|coach| coach.hourly_rate * hours)
        .unwrap_or(Decimal::ZERO);

    let mut breakdown = PricingBreakdown {
        base_price: round_money(base_price),
        peak_fee: round_money(peak_fee),
        weekend_fee: round_money(weekend_fee),
        equipment_fee: round_money(equipment_fee),
        coach_fee: round_money(coach_fee),
        total: Decimal::ZERO,
    };
    breakdown.total = breakdown.base_price
        + breakdown.peak_fee
        + breakdown.weekend_fee
        + breakdown.equipment_fee
        + breakdown.coach_fee;
    breakdown
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    fn court(court_type: CourtType, base_price: Decimal) -> Court {
        let now = Utc::now();
        Court {
            id: Uuid::new_v4(),
            name: "Apex Badminton Centre".to_string(),
            image_url: String::new(),
            court_type,
            base_price,
            rating: 4.6,
            rating_count: 180,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn rule(kind: RuleKind, condition: RuleCondition, value: Decimal) -> PricingRule {
        let now = Utc::now();
        PricingRule {
            id: Uuid::new_v4(),
            name: "rule".to_string(),
            kind,
            condition,
            value,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn hours(condition_start: u8, condition_end: u8) -> RuleCondition {
        RuleCondition {
            start_hour: Some(condition_start),
            end_hour: Some(condition_end),
            ..Default::default()
        }
    }

    // 2025-03-05 is a Wednesday, 2025-03-08 a Saturday.
    fn window(day: u32, from: u32, to: u32) -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 3, day, from, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, day, to, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_base_price_scales_with_duration() {
        let c = court(CourtType::Indoor, dec!(300));
        let input = PricingInput {
            court: &c,
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 5, 11, 30, 0).unwrap(),
            )
            .unwrap(),
            coach: None,
            equipment: vec![],
        };
        let breakdown = calculate(&input, &[], Tz::UTC);
        assert_eq!(breakdown.base_price, dec!(450));
        assert_eq!(breakdown.total, dec!(450));
    }

    #[test]
    fn test_multiplier_scales_running_base_in_order() {
        let c = court(CourtType::Indoor, dec!(100));
        let rules = vec![
            rule(RuleKind::Multiplier, hours(18, 22), dec!(1.5)),
            rule(RuleKind::Multiplier, RuleCondition::default(), dec!(2)),
        ];
        let input = PricingInput {
            court: &c,
            window: window(5, 19, 20),
            coach: None,
            equipment: vec![],
        };
        let breakdown = calculate(&input, &rules, Tz::UTC);
        assert_eq!(breakdown.base_price, dec!(300));
    }

    #[test]
    fn test_hour_range_is_half_open() {
        let condition = hours(18, 22);
        let at = |h| Utc.with_ymd_and_hms(2025, 3, 5, h, 0, 0).unwrap().with_timezone(&Tz::UTC);
        assert!(!rule_applies(&condition, CourtType::Indoor, &at(17)));
        assert!(rule_applies(&condition, CourtType::Indoor, &at(18)));
        assert!(rule_applies(&condition, CourtType::Indoor, &at(21)));
        assert!(!rule_applies(&condition, CourtType::Indoor, &at(22)));
    }

    #[test]
    fn test_single_hour_bound_is_not_a_condition() {
        let condition = RuleCondition {
            start_hour: Some(23),
            ..Default::default()
        };
        let local = Utc
            .with_ymd_and_hms(2025, 3, 5, 8, 0, 0)
            .unwrap()
            .with_timezone(&Tz::UTC);
        assert!(rule_applies(&condition, CourtType::Outdoor, &local));
    }

    #[test]
    fn test_fixed_fees_are_classified() {
        let c = court(CourtType::Indoor, dec!(350));
        let rules = vec![
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    day_of_week: vec![0, 6],
                    ..Default::default()
                },
                dec!(80),
            ),
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    court_types: vec![CourtType::Indoor],
                    ..Default::default()
                },
                dec!(40),
            ),
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    court_types: vec![CourtType::Outdoor],
                    ..Default::default()
                },
                dec!(-15),
            ),
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    date: NaiveDate::from_ymd_opt(2025, 3, 8),
                    ..Default::default()
                },
                dec!(100),
            ),
        ];
        let input = PricingInput {
            court: &c,
            window: window(8, 10, 11),
            coach: None,
            equipment: vec![],
        };
        let breakdown = calculate(&input, &rules, Tz::UTC);
        assert_eq!(breakdown.weekend_fee, dec!(180));
        assert_eq!(breakdown.peak_fee, dec!(40));
        assert_eq!(breakdown.total, dec!(570));
    }

    #[test]
    fn test_inactive_rules_are_skipped() {
        let c = court(CourtType::Outdoor, dec!(200));
        let mut surcharge = rule(RuleKind::Fixed, RuleCondition::default(), dec!(25));
        surcharge.is_active = false;
        let input = PricingInput {
            court: &c,
            window: window(5, 10, 11),
            coach: None,
            equipment: vec![],
        };
        assert_eq!(calculate(&input, &[surcharge], Tz::UTC).peak_fee, dec!(0));
    }

    #[test]
    fn test_weekday_and_date_follow_facility_zone() {
        let c = court(CourtType::Indoor, dec!(350));
        let rules = vec![
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    day_of_week: vec![0, 6],
                    ..Default::default()
                },
                dec!(80),
            ),
            rule(
                RuleKind::Fixed,
                RuleCondition {
                    date: NaiveDate::from_ymd_opt(2025, 3, 8),
                    ..Default::default()
                },
                dec!(100),
            ),
        ];
        // Friday 20:00 UTC is Saturday 01:30 in Kolkata.
        let input = PricingInput {
            court: &c,
            window: window(7, 20, 21),
            coach: None,
            equipment: vec![],
        };

        let local = calculate(&input, &rules, chrono_tz::Asia::Kolkata);
        assert_eq!(local.weekend_fee, dec!(180));
        assert_eq!(local.total, dec!(530));

        let utc = calculate(&input, &rules, Tz::UTC);
        assert_eq!(utc.weekend_fee, dec!(0));
        assert_eq!(utc.total, dec!(350));
    }

    #[test]
    fn test_hour_range_uses_local_hour() {
        let condition = hours(18, 22);
        let start = Utc.with_ymd_and_hms(2025, 3, 5, 13, 0, 0).unwrap();
        assert!(rule_applies(
            &condition,
            CourtType::Indoor,
            &start.with_timezone(&chrono_tz::Asia::Kolkata)
        ));
        assert!(!rule_applies(&condition, CourtType::Indoor, &start.with_timezone(&Tz::UTC)));
    }

    #[test]
    fn test_equipment_and_coach_fees() {
        let c = court(CourtType::Indoor, dec!(300));
        let now = Utc::now();
        let shoes = Equipment {
            id: Uuid::new_v4(),
            name: "Badminton Shoes".to_string(),
            total_stock: 15,
            per_unit_fee: dec!(50),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let coach = Coach {
            id: Uuid::new_v4(),
            name: "Coach John".to_string(),
            expertise: None,
            hourly_rate: dec!(150),
            availability: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let input = PricingInput {
            court: &c,
            window: window(5, 10, 12),
            coach: Some(&coach),
            equipment: vec![(&shoes, 2)],
        };
        let breakdown = calculate(&input, &[], Tz::UTC);
        assert_eq!(breakdown.equipment_fee, dec!(100));
        assert_eq!(breakdown.coach_fee, dec!(300));
        assert_eq!(breakdown.total, dec!(1000));
    }

    #[test]
    fn test_total_is_sum_of_rounded_components() {
        let c = court(CourtType::Indoor, dec!(100));
        // 20 minutes at 100/h with a 1.15 multiplier leaves fractional cents.
        let input = PricingInput {
            court: &c,
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 3, 5, 10, 20, 0).unwrap(),
            )
            .unwrap(),
            coach: None,
            equipment: vec![],
        };
        let rules = vec![
            rule(RuleKind::Multiplier, RuleCondition::default(), dec!(1.15)),
            rule(RuleKind::Fixed, RuleCondition::default(), dec!(0.333)),
        ];
        let b = calculate(&input, &rules, Tz::UTC);
        assert_eq!(b.base_price, dec!(38.33));
        assert_eq!(b.peak_fee, dec!(0.33));
        assert_eq!(
            b.total,
            b.base_price + b.peak_fee + b.weekend_fee + b.equipment_fee + b.coach_fee
        );
    }

    #[test]
    fn test_round_money_uses_bankers_rounding() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.34));
        assert_eq!(round_money(dec!(2.355)), dec!(2.36));
    }
}
