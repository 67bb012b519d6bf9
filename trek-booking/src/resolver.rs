use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};
use trek_catalog::ResourceId;
use trek_core::{AvailabilityError, AvailabilityService, MonthAvailability, Slot, YearMonth};

/// A month query issued by the resolver. Only the newest request for the
/// displayed (resource, month) pair may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRequest {
    pub resource_id: ResourceId,
    pub month: YearMonth,
    ticket: u64,
}

impl MonthRequest {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AvailabilityStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    Ready,
    /// The displayed month could not be loaded; retryable
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Response for a month or resource no longer displayed, or superseded
    /// by a newer request for the same pair
    Stale,
}

/// Month-scoped availability cache for one resource at a time.
///
/// Raw payloads are cached untouched; every derived answer (disabled dates,
/// selectable times) is computed against the caller's clock at query time.
#[derive(Debug, Default)]
pub struct AvailabilityResolver {
    resource_id: Option<ResourceId>,
    cache: HashMap<YearMonth, MonthAvailability>,
    latest: Option<MonthRequest>,
    next_ticket: u64,
    status: AvailabilityStatus,
}

impl AvailabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh request for `month`, which becomes the displayed month.
    /// Switching resource drops every cached month.
    pub fn request(&mut self, resource_id: ResourceId, month: YearMonth) -> MonthRequest {
        if self.resource_id != Some(resource_id) {
            if self.resource_id.is_some() {
                debug!("Resource changed to {}, dropping {} cached months", resource_id, self.cache.len());
            }
            self.cache.clear();
            self.resource_id = Some(resource_id);
        }

        self.next_ticket += 1;
        let request = MonthRequest {
            resource_id,
            month,
            ticket: self.next_ticket,
        };
        self.latest = Some(request);
        self.status = AvailabilityStatus::Loading;
        request
    }

    /// Re-issue the displayed month's request after a failure
    pub fn retry(&mut self) -> Option<MonthRequest> {
        let latest = self.latest?;
        Some(self.request(latest.resource_id, latest.month))
    }

    pub fn apply(
        &mut self,
        request: MonthRequest,
        result: Result<MonthAvailability, AvailabilityError>,
    ) -> ApplyOutcome {
        if self.latest != Some(request) {
            debug!(
                "Discarding stale availability for {} {} (ticket {})",
                request.resource_id, request.month, request.ticket
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(month) => {
                self.cache.insert(request.month, month);
                self.status = AvailabilityStatus::Ready;
            }
            Err(e) => {
                warn!("Availability for {} {} failed: {}", request.resource_id, request.month, e);
                self.status = AvailabilityStatus::Unavailable(e.to_string());
            }
        }
        ApplyOutcome::Applied
    }

    /// Request, fetch and apply in one step
    pub async fn load(
        &mut self,
        service: &dyn AvailabilityService,
        resource_id: ResourceId,
        month: YearMonth,
    ) -> ApplyOutcome {
        let request = self.request(resource_id, month);
        let result = service.month_availability(resource_id, month).await;
        self.apply(request, result)
    }

    pub fn status(&self) -> &AvailabilityStatus {
        &self.status
    }

    pub fn resource_id(&self) -> Option<ResourceId> {
        self.resource_id
    }

    pub fn displayed_month(&self) -> Option<YearMonth> {
        self.latest.map(|r| r.month)
    }

    /// Cached payload covering `date`, if its month has been loaded
    pub fn month_of(&self, date: NaiveDate) -> Option<&MonthAvailability> {
        self.cache.get(&YearMonth::of(date))
    }

    pub fn slots_on(&self, date: NaiveDate) -> &[Slot] {
        self.month_of(date).map(|m| m.slots_on(date)).unwrap_or(&[])
    }

    pub fn is_date_disabled(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date < today || self.month_of(date).is_some_and(|m| m.is_fully_booked(date))
    }

    pub fn fully_booked_dates(&self, month: YearMonth) -> BTreeSet<NaiveDate> {
        self.cache
            .get(&month)
            .map(MonthAvailability::fully_booked)
            .unwrap_or_default()
    }

    /// Disabled days of the displayed month
    pub fn disabled_dates(&self, today: NaiveDate) -> BTreeSet<NaiveDate> {
        match self.displayed_month() {
            Some(month) => month
                .days()
                .filter(|d| self.is_date_disabled(*d, today))
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Start times still bookable on `date`. On the current day a slot that
    /// has already started is excluded.
    pub fn selectable_times(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<NaiveTime> {
        if self.is_date_disabled(date, now.date()) {
            return Vec::new();
        }
        let Some(month) = self.month_of(date) else {
            return Vec::new();
        };

        month
            .open_slots(date)
            .filter(|slot| date != now.date() || slot.time > now.time())
            .map(|slot| slot.time)
            .collect()
    }

    pub fn is_selectable(&self, date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> bool {
        self.selectable_times(date, now).contains(&time)
    }
}
