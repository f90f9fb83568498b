//! Demo catalog for local development.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    AvailabilityWindow, Coach, Court, CourtType, Equipment, PricingRule, RuleCondition, RuleKind,
};
use crate::store::{Store, StoreError};

const COURTS: &[(&str, CourtType, i64, f64, u32)] = &[
    ("Battlefields Sports Arena", CourtType::Indoor, 350, 4.8, 220),
    ("Apex Badminton Centre", CourtType::Indoor, 300, 4.6, 180),
    ("Hiline Badminton Academy", CourtType::Indoor, 400, 4.9, 340),
    ("A1 Sports Club", CourtType::Indoor, 250, 4.5, 150),
    ("SBM Sports Club", CourtType::Outdoor, 200, 4.4, 140),
    ("Vega Badminton Arena", CourtType::Indoor, 450, 5.0, 420),
    ("SNS Sports Nest", CourtType::Outdoor, 200, 4.3, 160),
    ("Rio Badminton Arena", CourtType::Outdoor, 230, 4.4, 140),
];

const COACHES: &[(&str, i64)] = &[
    ("Coach John", 150),
    ("Coach Priya", 200),
    ("Coach Arjun", 180),
    ("Coach Neha", 220),
    ("Coach Kavya", 250),
];

const EQUIPMENT: &[(&str, u32, i64)] = &[
    ("Racket", 20, 30),
    ("Badminton Shoes", 15, 50),
    ("Shuttlecock", 100, 10),
    ("Grip Tape", 50, 12),
    ("Training Ladder", 5, 100),
];

/// Inserts the demo catalog unless the store already has courts.
pub async fn seed_demo_data(store: &dyn Store) -> Result<(), StoreError> {
    if !store.list_courts(false).await?.is_empty() {
        info!("Store already has courts, skipping demo seed");
        return Ok(());
    }

    let now = Utc::now();

    for (name, court_type, price, rating, rating_count) in COURTS {
        store
            .insert_court(&Court {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                image_url: String::new(),
                court_type: *court_type,
                base_price: Decimal::from(*price),
                rating: *rating,
                rating_count: *rating_count,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    // 06:00-22:00 every day
    let availability: Vec<_> = (0..=6)
        .map(|day_of_week| AvailabilityWindow {
            day_of_week,
            start_hour: 6,
            end_hour: 22,
        })
        .collect();
    for (name, rate) in COACHES {
        store
            .insert_coach(&Coach {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                expertise: None,
                hourly_rate: Decimal::from(*rate),
                availability: availability.clone(),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    for (name, stock, fee) in EQUIPMENT {
        store
            .insert_equipment(&Equipment {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                total_stock: *stock,
                per_unit_fee: Decimal::from(*fee),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let rules = demo_rules();
    for (offset, (name, kind, condition, value)) in rules.into_iter().enumerate() {
        // Keeps evaluation order stable on stores that sort by creation time.
        let created_at = now + chrono::Duration::milliseconds(offset as i64);
        store
            .insert_pricing_rule(&PricingRule {
                id: Uuid::new_v4(),
                name: name.to_string(),
                kind,
                condition,
                value,
                is_active: true,
                created_at,
                updated_at: created_at,
            })
            .await?;
    }

    info!(
        courts = COURTS.len(),
        coaches = COACHES.len(),
        equipment = EQUIPMENT.len(),
        "Seeded demo data"
    );
    Ok(())
}

fn demo_rules() -> Vec<(&'static str, RuleKind, RuleCondition, Decimal)> {
    vec![
        (
            "Weekend Surcharge",
            RuleKind::Fixed,
            RuleCondition {
                day_of_week: vec![0, 6],
                ..Default::default()
            },
            Decimal::from(80),
        ),
        (
            "Evening Peak",
            RuleKind::Multiplier,
            RuleCondition {
                start_hour: Some(18),
                end_hour: Some(22),
                ..Default::default()
            },
            Decimal::new(15, 1),
        ),
        (
            "Morning Discount",
            RuleKind::Fixed,
            RuleCondition {
                start_hour: Some(6),
                end_hour: Some(9),
                ..Default::default()
            },
            Decimal::from(-20),
        ),
        (
            "Indoor Premium",
            RuleKind::Fixed,
            RuleCondition {
                court_types: vec![CourtType::Indoor],
                ..Default::default()
            },
            Decimal::from(40),
        ),
        (
            "Holiday Pricing",
            RuleKind::Fixed,
            RuleCondition {
                date: NaiveDate::from_ymd_opt(2025, 12, 25),
                ..Default::default()
            },
            Decimal::from(100),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_fills_empty_store_once() {
        let store = MemoryStore::new();

        seed_demo_data(&store).await.unwrap();
        seed_demo_data(&store).await.unwrap();

        assert_eq!(store.list_courts(false).await.unwrap().len(), COURTS.len());
        assert_eq!(store.list_coaches(false).await.unwrap().len(), COACHES.len());
        assert_eq!(store.list_equipment(false).await.unwrap().len(), EQUIPMENT.len());
        let rules = store.active_pricing_rules().await.unwrap();
        assert_eq!(rules.first().unwrap().name, "Weekend Surcharge");
    }
}
