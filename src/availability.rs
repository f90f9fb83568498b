use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, Coach, Equipment};

/// A half-open booking interval `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Confirmed bookings only; cancelled ones never hold resources.
    pub fn overlaps_booking(&self, booking: &Booking) -> bool {
        booking.is_confirmed() && self.overlaps(booking.start_time, booking.end_time)
    }

    pub fn duration_hours(&self) -> Decimal {
        let seconds = (self.end - self.start).num_seconds();
        Decimal::from(seconds) / Decimal::from(3600)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoachUnavailable {
    #[error("coach is not active")]
    Inactive,
    #[error("booking spans more than one calendar day")]
    SpansDays,
    #[error("booking is outside the coach's working hours")]
    OutsideHours,
    #[error("coach already has a booking in this window")]
    AlreadyBooked,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipmentUnavailable {
    #[error("Equipment {name} is not active")]
    Inactive { name: String },
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    Insufficient {
        name: String,
        available: i64,
        requested: u32,
    },
}

pub fn is_court_available(bookings: &[Booking], court_id: Uuid, window: &TimeWindow) -> bool {
    !bookings
        .iter()
        .any(|b| b.court_id == court_id && window.overlaps_booking(b))
}

/// Checks the coach's weekly calendar for the window, in facility time.
pub fn within_working_hours(
    coach: &Coach,
    window: &TimeWindow,
    tz: Tz,
) -> Result<(), CoachUnavailable> {
    let start = window.start.with_timezone(&tz);
    let end = window.end.with_timezone(&tz);
    if start.date_naive() != end.date_naive() {
        return Err(CoachUnavailable::SpansDays);
    }

    let day = start.weekday().num_days_from_sunday();
    let start_minutes = start.hour() * 60 + start.minute();
    let end_minutes = end.hour() * 60 + end.minute();

    let fits = coach.availability.iter().any(|slot| {
        u32::from(slot.day_of_week) == day
            && start_minutes >= u32::from(slot.start_hour) * 60
            && end_minutes <= u32::from(slot.end_hour) * 60
    });

    if fits {
        Ok(())
    } else {
        Err(CoachUnavailable::OutsideHours)
    }
}

pub fn check_coach(
    coach: &Coach,
    bookings: &[Booking],
    window: &TimeWindow,
    tz: Tz,
) -> Result<(), CoachUnavailable> {
    if !coach.is_active {
        return Err(CoachUnavailable::Inactive);
    }
    within_working_hours(coach, window, tz)?;

    let booked = bookings
        .iter()
        .any(|b| b.resources.coach_id == Some(coach.id) && window.overlaps_booking(b));
    if booked {
        return Err(CoachUnavailable::AlreadyBooked);
    }
    Ok(())
}

pub fn booked_quantity(bookings: &[Booking], equipment_id: Uuid, window: &TimeWindow) -> u64 {
    bookings
        .iter()
        .filter(|b| window.overlaps_booking(b))
        .map(|b| u64::from(b.resources.quantity_of(equipment_id)))
        .sum()
}

/// Every requested item must be active with enough unbooked stock for the
/// whole window. Stops at the first item that fails.
pub fn check_equipment(
    requested: &[(&Equipment, u32)],
    bookings: &[Booking],
    window: &TimeWindow,
) -> Result<(), EquipmentUnavailable> {
    for (item, quantity) in requested {
        if !item.is_active {
            return Err(EquipmentUnavailable::Inactive {
                name: item.name.clone(),
            });
        }

        let booked = booked_quantity(bookings, item.id, window);
        let available = i64::from(item.total_stock) - booked as i64;
        if available < i64::from(*quantity) {
            return Err(EquipmentUnavailable::Insufficient {
                name: item.name.clone(),
                available,
                requested: *quantity,
            });
        }
    }
    Ok(())
}
