//! Persistence for the catalog and bookings.
//!
//! Two backends implement [`Store`]: [`MemoryStore`] keeps everything in
//! process and [`PgStore`] talks to PostgreSQL. Booking creation goes
//! through a [`StoreTx`] so the availability checks and the insert see one
//! consistent snapshot.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::availability::TimeWindow;
use crate::models::{Booking, BookingStatus, Coach, Court, Equipment, PricingRule};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("record already exists")]
    Duplicate,
    #[error("concurrent update conflict")]
    Conflict,
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.into_owned()));
        match code.as_deref() {
            // serialization_failure, deadlock_detected
            Some("40001") | Some("40P01") => StoreError::Conflict,
            // unique_violation
            Some("23505") => StoreError::Duplicate,
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_courts(&self, active_only: bool) -> Result<Vec<Court>, StoreError>;
    async fn get_court(&self, id: Uuid) -> Result<Option<Court>, StoreError>;
    async fn insert_court(&self, court: &Court) -> Result<(), StoreError>;
    /// Returns `false` when no court has the id.
    async fn update_court(&self, court: &Court) -> Result<bool, StoreError>;
    async fn delete_court(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list_coaches(&self, active_only: bool) -> Result<Vec<Coach>, StoreError>;
    async fn get_coach(&self, id: Uuid) -> Result<Option<Coach>, StoreError>;
    async fn insert_coach(&self, coach: &Coach) -> Result<(), StoreError>;
    async fn update_coach(&self, coach: &Coach) -> Result<bool, StoreError>;

    async fn list_equipment(&self, active_only: bool) -> Result<Vec<Equipment>, StoreError>;
    async fn get_equipment(&self, id: Uuid) -> Result<Option<Equipment>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the name is taken.
    async fn insert_equipment(&self, equipment: &Equipment) -> Result<(), StoreError>;
    async fn update_equipment(&self, equipment: &Equipment) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError>;
    /// Active rules in evaluation (creation) order.
    async fn active_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError>;
    async fn get_pricing_rule(&self, id: Uuid) -> Result<Option<PricingRule>, StoreError>;
    async fn find_pricing_rule_by_date(
        &self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Option<PricingRule>, StoreError>;
    async fn insert_pricing_rule(&self, rule: &PricingRule) -> Result<(), StoreError>;
    async fn update_pricing_rule(&self, rule: &PricingRule) -> Result<bool, StoreError>;
    async fn delete_pricing_rule(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All bookings, or one user's, latest start time first.
    async fn list_bookings(&self, user_id: Option<Uuid>) -> Result<Vec<Booking>, StoreError>;
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError>;

    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError>;
}

/// A booking transaction. Dropping it without [`StoreTx::commit`] discards
/// every write made through it.
#[async_trait]
pub trait StoreTx: Send {
    async fn court(&mut self, id: Uuid) -> Result<Option<Court>, StoreError>;
    async fn coach(&mut self, id: Uuid) -> Result<Option<Coach>, StoreError>;
    async fn equipment(&mut self, id: Uuid) -> Result<Option<Equipment>, StoreError>;
    async fn active_pricing_rules(&mut self) -> Result<Vec<PricingRule>, StoreError>;
    /// Confirmed bookings for any resource that overlap `window`.
    async fn overlapping_bookings(
        &mut self,
        window: &TimeWindow,
    ) -> Result<Vec<Booking>, StoreError>;
    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
