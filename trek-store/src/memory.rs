use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use trek_catalog::{Resource, ResourceId};
use trek_core::{
    AvailabilityError, AvailabilityService, BookingReference, BookingStore, BookingStoreError, CartBoundary,
    CartError, CatalogReader, CheckoutBoundary, LineItem, MonthAvailability, OperatorBookingRecord, Slot,
    YearMonth,
};

use crate::schedule_repo::assemble_month;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Default)]
pub struct InMemoryCatalog {
    resources: RwLock<HashMap<ResourceId, Resource>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, resource: Resource) {
        self.resources.write().await.insert(resource.id, resource);
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn get_resource(
        &self,
        id: ResourceId,
    ) -> Result<Option<Resource>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Default)]
pub struct InMemorySchedule {
    slots: RwLock<HashMap<ResourceId, BTreeMap<NaiveDate, Vec<Slot>>>>,
    closures: RwLock<HashMap<ResourceId, BTreeSet<NaiveDate>>>,
}

impl InMemorySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a departure, replacing one at the same start time
    pub async fn add_slot(&self, resource_id: ResourceId, date: NaiveDate, slot: Slot) {
        let mut slots = self.slots.write().await;
        let day = slots.entry(resource_id).or_default().entry(date).or_default();
        day.retain(|s| s.time != slot.time);
        day.push(slot);
    }

    pub async fn close_date(&self, resource_id: ResourceId, date: NaiveDate) {
        self.closures.write().await.entry(resource_id).or_default().insert(date);
    }
}

#[async_trait]
impl AvailabilityService for InMemorySchedule {
    async fn month_availability(
        &self,
        resource_id: ResourceId,
        month: YearMonth,
    ) -> Result<MonthAvailability, AvailabilityError> {
        let slots = self.slots.read().await;
        let closures = self.closures.read().await;

        let days = slots
            .get(&resource_id)
            .into_iter()
            .flat_map(|days| days.range(month.first_day()..=month.last_day()))
            .flat_map(|(date, slots)| slots.iter().map(move |slot| (*date, *slot)));
        let closed = closures
            .get(&resource_id)
            .into_iter()
            .flat_map(|dates| dates.range(month.first_day()..=month.last_day()).copied());

        Ok(assemble_month(days, closed))
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredBooking {
    pub reference: BookingReference,
    pub record: OperatorBookingRecord,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<Vec<StoredBooking>>,
    rejection: RwLock<Option<String>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following submission fail with `reason`
    pub async fn reject_with(&self, reason: &str) {
        *self.rejection.write().await = Some(reason.to_string());
    }

    pub async fn bookings(&self) -> Vec<StoredBooking> {
        self.bookings.read().await.clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_booking(
        &self,
        record: &OperatorBookingRecord,
    ) -> Result<BookingReference, BookingStoreError> {
        if let Some(reason) = self.rejection.read().await.clone() {
            return Err(BookingStoreError::Rejected(reason));
        }

        let reference = BookingReference::generate();
        self.bookings.write().await.push(StoredBooking {
            reference: reference.clone(),
            record: record.clone(),
            created_at: Utc::now(),
        });
        Ok(reference)
    }
}

// ============================================================================
// Cart
// ============================================================================

/// Cart and checkout boundary kept in process memory
#[derive(Default)]
pub struct InMemoryCart {
    items: RwLock<Vec<LineItem>>,
    in_checkout: AtomicBool,
}

impl InMemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn items(&self) -> Vec<LineItem> {
        self.items.read().await.clone()
    }

    pub fn in_checkout(&self) -> bool {
        self.in_checkout.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CartBoundary for InMemoryCart {
    async fn add_line_item(&self, item: &LineItem) -> Result<(), CartError> {
        self.items.write().await.push(item.clone());
        Ok(())
    }
}

#[async_trait]
impl CheckoutBoundary for InMemoryCart {
    async fn enter_checkout(&self) -> Result<(), CartError> {
        if self.items.read().await.is_empty() {
            return Err(CartError::Rejected("Cart is empty".to_string()));
        }
        self.in_checkout.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use trek_booking::{BookingFlow, DraftAction, HandoffIntent, ReservationHandoff};
    use trek_catalog::AddOnCatalog;
    use trek_core::ManualClock;
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_schedule_month_window() {
        let schedule = InMemorySchedule::new();
        let resource = Uuid::new_v4();
        schedule.add_slot(resource, date(20), Slot::new(time(9), 4)).await;
        schedule.add_slot(resource, date(20), Slot::new(time(9), 2)).await;
        schedule.add_slot(resource, date(31), Slot::new(time(9), 0)).await;
        schedule
            .add_slot(resource, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(), Slot::new(time(9), 8))
            .await;
        schedule.close_date(resource, date(25)).await;

        let month = schedule
            .month_availability(resource, YearMonth::new(2026, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(month.available_slots_by_date.len(), 2);
        assert_eq!(month.slots_on(date(20)), &[Slot::new(time(9), 2)]);
        assert!(month.fully_booked_dates.contains(&date(25)));
        assert!(month.fully_booked_dates.contains(&date(31)));

        let other = schedule
            .month_availability(Uuid::new_v4(), YearMonth::new(2026, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(other, MonthAvailability::default());
    }

    #[tokio::test]
    async fn test_booking_store_rejection() {
        let store = InMemoryBookingStore::new();
        let record = OperatorBookingRecord {
            resource_id: Some(Uuid::new_v4()),
            variant_id: None,
            customer: None,
            schedule: Default::default(),
            add_on: None,
            pricing: Default::default(),
            payment: Default::default(),
            notes: String::new(),
        };

        let reference = store.create_booking(&record).await.unwrap();
        assert!(reference.as_str().starts_with(BookingReference::PREFIX));

        store.reject_with("Departure cancelled").await;
        assert_eq!(
            store.create_booking(&record).await,
            Err(BookingStoreError::Rejected("Departure cancelled".to_string()))
        );
        assert_eq!(store.bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn test_storefront_flow_end_to_end() {
        let resource = Resource::new("Harbour Kayak Tour", dec!(100));
        let schedule = InMemorySchedule::new();
        schedule.add_slot(resource.id, date(21), Slot::new(time(9), 6)).await;

        let clock = Arc::new(ManualClock::new(date(20).and_hms_opt(12, 0, 0).unwrap()));
        let mut flow = BookingFlow::new(resource, Arc::new(AddOnCatalog::default()), clock);
        let _ = flow.open();
        flow.load_month(&schedule, YearMonth::new(2026, 10).unwrap()).await;

        assert!(flow.dispatch(DraftAction::SelectDate(date(21))));
        assert!(flow.dispatch(DraftAction::SelectTime(time(9))));
        assert!(flow.advance());
        assert!(flow.advance());
        assert!(flow.dispatch(DraftAction::SelectAddOn {
            id: "food-tasting".to_string(),
            time: time(13),
        }));
        assert!(flow.advance());

        let cart = Arc::new(InMemoryCart::new());
        let handoff = ReservationHandoff::new(cart.clone(), cart.clone());
        let receipt = handoff.submit(&mut flow, HandoffIntent::Checkout).await.unwrap();

        assert!(receipt.entered_checkout);
        assert!(cart.in_checkout());
        let items = cart.items().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].amount(), dec!(45));
        assert_eq!(items[1].time, Some(time(13)));
    }
}
