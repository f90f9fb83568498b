use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreError, StoreTx};
use crate::availability::TimeWindow;
use crate::models::{Booking, BookingStatus, Coach, Court, Equipment, PricingRule};

/// Collections in insertion order.
#[derive(Debug, Default)]
struct Collections {
    courts: Vec<Court>,
    coaches: Vec<Coach>,
    equipment: Vec<Equipment>,
    pricing_rules: Vec<PricingRule>,
    bookings: Vec<Booking>,
}

impl Collections {
    fn equipment_name_taken(&self, name: &str, except: Uuid) -> bool {
        self.equipment
            .iter()
            .any(|e| e.id != except && e.name == name)
    }
}

fn replace<T>(items: &mut [T], id_of: impl Fn(&T) -> Uuid, item: &T) -> bool
where
    T: Clone,
{
    let id = id_of(item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => {
            *slot = item.clone();
            true
        }
        None => false,
    }
}

fn newest_first<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().rev().filter(|i| keep(i)).cloned().collect()
}

/// In-process store. A transaction holds the lock until it is committed or
/// dropped, which serializes booking creation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_courts(&self, active_only: bool) -> Result<Vec<Court>, StoreError> {
        let data = self.inner.lock().await;
        Ok(newest_first(&data.courts, |c| !active_only || c.is_active))
    }

    async fn get_court(&self, id: Uuid) -> Result<Option<Court>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data.courts.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_court(&self, court: &Court) -> Result<(), StoreError> {
        self.inner.lock().await.courts.push(court.clone());
        Ok(())
    }

    async fn update_court(&self, court: &Court) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        Ok(replace(&mut data.courts, |c| c.id, court))
    }

    async fn delete_court(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        let before = data.courts.len();
        data.courts.retain(|c| c.id != id);
        Ok(data.courts.len() != before)
    }

    async fn list_coaches(&self, active_only: bool) -> Result<Vec<Coach>, StoreError> {
        let data = self.inner.lock().await;
        Ok(newest_first(&data.coaches, |c| !active_only || c.is_active))
    }

    async fn get_coach(&self, id: Uuid) -> Result<Option<Coach>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data.coaches.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_coach(&self, coach: &Coach) -> Result<(), StoreError> {
        self.inner.lock().await.coaches.push(coach.clone());
        Ok(())
    }

    async fn update_coach(&self, coach: &Coach) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        Ok(replace(&mut data.coaches, |c| c.id, coach))
    }

    async fn list_equipment(&self, active_only: bool) -> Result<Vec<Equipment>, StoreError> {
        let data = self.inner.lock().await;
        Ok(newest_first(&data.equipment, |e| !active_only || e.is_active))
    }

    async fn get_equipment(&self, id: Uuid) -> Result<Option<Equipment>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data.equipment.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> Result<(), StoreError> {
        let mut data = self.inner.lock().await;
        if data.equipment_name_taken(&equipment.name, equipment.id) {
            return Err(StoreError::Duplicate);
        }
        data.equipment.push(equipment.clone());
        Ok(())
    }

    async fn update_equipment(&self, equipment: &Equipment) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        if data.equipment_name_taken(&equipment.name, equipment.id) {
            return Err(StoreError::Duplicate);
        }
        Ok(replace(&mut data.equipment, |e| e.id, equipment))
    }

    async fn list_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError> {
        let data = self.inner.lock().await;
        Ok(newest_first(&data.pricing_rules, |_| true))
    }

    async fn active_pricing_rules(&self) -> Result<Vec<PricingRule>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data
            .pricing_rules
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn get_pricing_rule(&self, id: Uuid) -> Result<Option<PricingRule>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data.pricing_rules.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pricing_rule_by_date(
        &self,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Option<PricingRule>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data
            .pricing_rules
            .iter()
            .find(|r| r.condition.date == Some(date) && Some(r.id) != exclude)
            .cloned())
    }

    async fn insert_pricing_rule(&self, rule: &PricingRule) -> Result<(), StoreError> {
        self.inner.lock().await.pricing_rules.push(rule.clone());
        Ok(())
    }

    async fn update_pricing_rule(&self, rule: &PricingRule) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        Ok(replace(&mut data.pricing_rules, |r| r.id, rule))
    }

    async fn delete_pricing_rule(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut data = self.inner.lock().await;
        let before = data.pricing_rules.len();
        data.pricing_rules.retain(|r| r.id != id);
        Ok(data.pricing_rules.len() != before)
    }

    async fn list_bookings(&self, user_id: Option<Uuid>) -> Result<Vec<Booking>, StoreError> {
        let data = self.inner.lock().await;
        let mut bookings: Vec<Booking> = data
            .bookings
            .iter()
            .filter(|b| user_id.is_none_or(|id| b.user_id == id))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(bookings)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut data = self.inner.lock().await;
        Ok(data.bookings.iter_mut().find(|b| b.id == id).map(|b| {
            b.status = status;
            b.updated_at = at;
            b.clone()
        }))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        Ok(Box::new(MemoryTx {
            data: guard,
            staged: Vec::new(),
        }))
    }
}

pub struct MemoryTx {
    data: OwnedMutexGuard<Collections>,
    staged: Vec<Booking>,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn court(&mut self, id: Uuid) -> Result<Option<Court>, StoreError> {
        Ok(self.data.courts.iter().find(|c| c.id == id).cloned())
    }

    async fn coach(&mut self, id: Uuid) -> Result<Option<Coach>, StoreError> {
        Ok(self.data.coaches.iter().find(|c| c.id == id).cloned())
    }

    async fn equipment(&mut self, id: Uuid) -> Result<Option<Equipment>, StoreError> {
        Ok(self.data.equipment.iter().find(|e| e.id == id).cloned())
    }

    async fn active_pricing_rules(&mut self) -> Result<Vec<PricingRule>, StoreError> {
        Ok(self
            .data
            .pricing_rules
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn overlapping_bookings(
        &mut self,
        window: &TimeWindow,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .data
            .bookings
            .iter()
            .chain(self.staged.iter())
            .filter(|b| window.overlaps_booking(b))
            .cloned()
            .collect())
    }

    async fn insert_booking(&mut self, booking: &Booking) -> Result<(), StoreError> {
        self.staged.push(booking.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTx { mut data, staged } = *self;
        data.bookings.extend(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{BookingResources, PricingBreakdown};

    fn booking(start: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            court_id: Uuid::new_v4(),
            start_time: start,
            end_time: start + Duration::hours(1),
            resources: BookingResources::default(),
            pricing_breakdown: PricingBreakdown::default(),
            status: BookingStatus::Confirmed,
            created_at: start,
            updated_at: start,
        }
    }

    fn equipment(name: &str) -> Equipment {
        let now = Utc::now();
        Equipment {
            id: Uuid::new_v4(),
            name: name.to_string(),
            total_stock: 10,
            per_unit_fee: dec!(15),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_booking() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_booking(&booking(start)).await.unwrap();
        }
        assert!(store.list_bookings(None).await.unwrap().is_empty());

        let mut tx = store.begin().await.unwrap();
        tx.insert_booking(&booking(start)).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.list_bookings(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transaction_sees_its_own_staged_bookings() {
        let store = MemoryStore::new();
        let start = Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap();
        let window = TimeWindow::new(start, start + Duration::minutes(30)).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_booking(&booking(start)).await.unwrap();
        assert_eq!(tx.overlapping_bookings(&window).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bookings_sorted_by_start_descending() {
        let store = MemoryStore::new();
        let early = Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 3, 6, 8, 0, 0).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_booking(&booking(early)).await.unwrap();
        tx.insert_booking(&booking(late)).await.unwrap();
        tx.commit().await.unwrap();

        let listed = store.list_bookings(None).await.unwrap();
        assert_eq!(listed[0].start_time, late);
        assert_eq!(listed[1].start_time, early);
    }

    #[tokio::test]
    async fn test_duplicate_equipment_name_rejected() {
        let store = MemoryStore::new();
        store.insert_equipment(&equipment("Racket")).await.unwrap();

        let err = store.insert_equipment(&equipment("Racket")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        let mut grip = equipment("Grip Tape");
        store.insert_equipment(&grip).await.unwrap();
        grip.name = "Racket".to_string();
        assert!(matches!(
            store.update_equipment(&grip).await,
            Err(StoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn test_status_update_keeps_booking() {
        let store = MemoryStore::new();
        let b = booking(Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap());
        let mut tx = store.begin().await.unwrap();
        tx.insert_booking(&b).await.unwrap();
        tx.commit().await.unwrap();

        let updated = store
            .set_booking_status(b.id, BookingStatus::Cancelled, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Cancelled);
        assert_eq!(store.list_bookings(None).await.unwrap().len(), 1);
        assert!(
            store
                .set_booking_status(Uuid::new_v4(), BookingStatus::Cancelled, Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }
}
