//! Booking creation, cancellation and price estimates.
//!
//! Creation loads the referenced records, checks availability and prices the
//! window inside one [`StoreTx`], so two requests competing for the same
//! court, coach or stock cannot both commit.

use chrono::Utc;
use chrono_tz::Tz;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Principal;
use crate::availability::{self, TimeWindow};
use crate::models::{
    Booking, BookingResources, BookingStatus, BookingView, CoachSummary, CourtSummary,
    EquipmentLine, EquipmentSummary, PricingBreakdown,
};
use crate::pricing::{self, PricingInput};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("not authorized to cancel this booking")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub court_id: Uuid,
    pub window: TimeWindow,
    pub coach_id: Option<Uuid>,
    /// One line per equipment id.
    pub equipment: Vec<EquipmentLine>,
}

pub async fn create_booking(
    store: &dyn Store,
    tz: Tz,
    principal: &Principal,
    draft: BookingDraft,
) -> Result<Booking, BookingError> {
    let mut tx = store.begin().await?;

    let court = tx
        .court(draft.court_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Court not found".into()))?;
    if !court.is_active {
        return Err(BookingError::Unavailable("Court is not active".into()));
    }

    let overlapping = tx.overlapping_bookings(&draft.window).await?;
    if !availability::is_court_available(&overlapping, court.id, &draft.window) {
        return Err(BookingError::Unavailable(
            "Court is not available for the selected time".into(),
        ));
    }

    let coach = match draft.coach_id {
        Some(coach_id) => {
            let coach = tx
                .coach(coach_id)
                .await?
                .ok_or_else(|| BookingError::NotFound("Coach not found".into()))?;
            if let Err(reason) = availability::check_coach(&coach, &overlapping, &draft.window, tz)
            {
                debug!(coach = %coach.id, "coach rejected: {reason}");
                return Err(BookingError::Unavailable(
                    "Coach is not available for the selected time".into(),
                ));
            }
            Some(coach)
        }
        None => None,
    };

    let mut items = Vec::with_capacity(draft.equipment.len());
    for line in &draft.equipment {
        let item = tx.equipment(line.equipment_id).await?.ok_or_else(|| {
            BookingError::NotFound(format!("Equipment {} not found", line.equipment_id))
        })?;
        items.push((item, line.quantity));
    }
    let requested: Vec<_> = items.iter().map(|(item, qty)| (item, *qty)).collect();
    availability::check_equipment(&requested, &overlapping, &draft.window)
        .map_err(|err| BookingError::Unavailable(err.to_string()))?;

    let rules = tx.active_pricing_rules().await?;
    let breakdown = pricing::calculate(
        &PricingInput {
            court: &court,
            window: draft.window,
            coach: coach.as_ref(),
            equipment: requested,
        },
        &rules,
        tz,
    );

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        user_id: principal.user_id,
        court_id: court.id,
        start_time: draft.window.start(),
        end_time: draft.window.end(),
        resources: BookingResources {
            equipment: draft.equipment,
            coach_id: coach.as_ref().map(|c| c.id),
        },
        pricing_breakdown: breakdown,
        status: BookingStatus::Confirmed,
        created_at: now,
        updated_at: now,
    };

    tx.insert_booking(&booking).await?;
    tx.commit().await?;

    info!(
        booking = %booking.id,
        court = %booking.court_id,
        user = %booking.user_id,
        total = %booking.pricing_breakdown.total,
        "Booking confirmed"
    );
    Ok(booking)
}

/// Prices a window without checking availability. Unknown coach or
/// equipment ids add nothing.
pub async fn estimate_price(
    store: &dyn Store,
    tz: Tz,
    draft: &BookingDraft,
) -> Result<PricingBreakdown, BookingError> {
    let court = store
        .get_court(draft.court_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Court not found".into()))?;

    let coach = match draft.coach_id {
        Some(id) => store.get_coach(id).await?,
        None => None,
    };

    let mut items = Vec::with_capacity(draft.equipment.len());
    for line in &draft.equipment {
        if let Some(item) = store.get_equipment(line.equipment_id).await? {
            items.push((item, line.quantity));
        }
    }

    let rules = store.active_pricing_rules().await?;
    Ok(pricing::calculate(
        &PricingInput {
            court: &court,
            window: draft.window,
            coach: coach.as_ref(),
            equipment: items.iter().map(|(item, qty)| (item, *qty)).collect(),
        },
        &rules,
        tz,
    ))
}

/// Marks a booking cancelled. Only the owner or an admin may do this;
/// cancelling twice leaves it cancelled.
pub async fn cancel_booking(
    store: &dyn Store,
    principal: &Principal,
    booking_id: Uuid,
) -> Result<Booking, BookingError> {
    let booking = store
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Booking not found".into()))?;

    if booking.user_id != principal.user_id && !principal.is_admin() {
        return Err(BookingError::Forbidden);
    }

    let cancelled = store
        .set_booking_status(booking.id, BookingStatus::Cancelled, Utc::now())
        .await?
        .ok_or_else(|| BookingError::NotFound("Booking not found".into()))?;

    info!(booking = %cancelled.id, by = %principal.user_id, "Booking cancelled");
    Ok(cancelled)
}

/// Resolves the court, coach and equipment a booking references.
pub async fn populate(store: &dyn Store, booking: Booking) -> Result<BookingView, StoreError> {
    let court = store.get_court(booking.court_id).await?;
    let coach = match booking.resources.coach_id {
        Some(id) => store.get_coach(id).await?,
        None => None,
    };

    let lookups = booking
        .resources
        .equipment
        .iter()
        .map(|line| store.get_equipment(line.equipment_id));
    let items = try_join_all(lookups).await?;

    let equipment = booking
        .resources
        .equipment
        .iter()
        .zip(items)
        .filter_map(|(line, item)| {
            item.map(|item| EquipmentSummary {
                id: item.id,
                name: item.name,
                per_unit_fee: item.per_unit_fee,
                quantity: line.quantity,
            })
        })
        .collect();

    Ok(BookingView {
        court: court.as_ref().map(CourtSummary::from),
        coach: coach.as_ref().map(CoachSummary::from),
        equipment,
        booking,
    })
}

pub async fn populate_all(
    store: &dyn Store,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingView>, StoreError> {
    try_join_all(bookings.into_iter().map(|b| populate(store, b))).await
}
