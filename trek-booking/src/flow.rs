use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use trek_catalog::{AddOnCatalog, PriceBreakdown, PricingEngine, PricingRequest, Resource};
use trek_core::{AvailabilityError, AvailabilityService, Clock, MonthAvailability, YearMonth};

use crate::draft::{BookingDraft, DraftAction};
use crate::resolver::{ApplyOutcome, AvailabilityResolver, AvailabilityStatus, MonthRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Schedule,
    Party,
    AddOns,
    Review,
    Closed,
}

/// Sub-state of the schedule step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePhase {
    ChoosingDate,
    ChoosingTime,
}

/// A finished draft moved out of the flow, ready to be handed to the cart
#[derive(Debug, Clone)]
pub struct Reservation {
    pub resource: Resource,
    pub add_ons: Arc<AddOnCatalog>,
    pub draft: BookingDraft,
    pub price: PriceBreakdown,
}

/// Four-step reservation flow: schedule, party, add-ons, review.
///
/// Owns the draft exclusively. Every accepted mutation replaces the draft
/// and recomputes the price before returning.
pub struct BookingFlow {
    resource: Resource,
    add_ons: Arc<AddOnCatalog>,
    pricing: PricingEngine,
    clock: Arc<dyn Clock>,
    resolver: AvailabilityResolver,
    step: BookingStep,
    phase: SchedulePhase,
    draft: BookingDraft,
    price: PriceBreakdown,
}

impl BookingFlow {
    pub fn new(resource: Resource, add_ons: Arc<AddOnCatalog>, clock: Arc<dyn Clock>) -> Self {
        let draft = BookingDraft::new(clock.today());
        let mut flow = Self {
            resource,
            add_ons,
            pricing: PricingEngine::self_service(),
            clock,
            resolver: AvailabilityResolver::new(),
            step: BookingStep::Closed,
            phase: SchedulePhase::ChoosingDate,
            draft,
            price: PriceBreakdown::default(),
        };
        flow.reprice();
        flow
    }

    /// Replace the fee policy used for the running price
    pub fn with_pricing(mut self, pricing: PricingEngine) -> Self {
        self.pricing = pricing;
        self.reprice();
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start over on the schedule step with a fresh draft and request the
    /// current month's availability.
    pub fn open(&mut self) -> MonthRequest {
        let today = self.clock.today();
        self.draft = BookingDraft::new(today);
        self.step = BookingStep::Schedule;
        self.phase = SchedulePhase::ChoosingDate;
        self.reprice();

        info!("Booking flow opened for resource {}", self.resource.id);
        self.resolver.request(self.resource.id, YearMonth::of(today))
    }

    /// Discard the draft from any step
    pub fn close(&mut self) {
        if self.step != BookingStep::Closed {
            info!("Booking flow closed for resource {}", self.resource.id);
        }
        self.step = BookingStep::Closed;
        self.draft = BookingDraft::new(self.clock.today());
        self.reprice();
    }

    pub fn is_open(&self) -> bool {
        self.step != BookingStep::Closed
    }

    /// Move the finished draft out of the flow and close it. Only possible
    /// from the review step.
    pub fn confirm(&mut self) -> Option<Reservation> {
        if self.step != BookingStep::Review || self.draft.time().is_none() {
            return None;
        }

        let today = self.clock.today();
        let draft = std::mem::replace(&mut self.draft, BookingDraft::new(today));
        let price = std::mem::take(&mut self.price);
        self.step = BookingStep::Closed;
        self.reprice();

        info!(
            "Reservation confirmed for {} on {} ({} guests)",
            self.resource.id,
            draft.date(),
            draft.guests()
        );
        Some(Reservation {
            resource: self.resource.clone(),
            add_ons: Arc::clone(&self.add_ons),
            draft,
            price,
        })
    }

    // ========================================================================
    // Availability
    // ========================================================================

    pub fn show_month(&mut self, month: YearMonth) -> MonthRequest {
        self.resolver.request(self.resource.id, month)
    }

    /// Switch to another resource. Cached availability is dropped and the
    /// chosen time, which belonged to the old resource, is cleared.
    pub fn change_resource(&mut self, resource: Resource) -> MonthRequest {
        let month = self
            .resolver
            .displayed_month()
            .unwrap_or_else(|| YearMonth::of(self.draft.date()));
        self.resource = resource;
        self.draft = self.draft.without_time();
        if self.is_open() {
            self.step = BookingStep::Schedule;
            self.phase = SchedulePhase::ChoosingDate;
        }
        self.reprice();
        self.resolver.request(self.resource.id, month)
    }

    pub fn retry_availability(&mut self) -> Option<MonthRequest> {
        self.resolver.retry()
    }

    pub fn receive_availability(
        &mut self,
        request: MonthRequest,
        result: Result<MonthAvailability, AvailabilityError>,
    ) -> ApplyOutcome {
        let outcome = self.resolver.apply(request, result);
        if outcome == ApplyOutcome::Applied {
            self.reconcile_selection();
        }
        outcome
    }

    /// Fetch and apply a month in one step
    pub async fn load_month(&mut self, service: &dyn AvailabilityService, month: YearMonth) -> ApplyOutcome {
        let request = self.show_month(month);
        let result = service.month_availability(request.resource_id, month).await;
        self.receive_availability(request, result)
    }

    pub fn availability_status(&self) -> &AvailabilityStatus {
        self.resolver.status()
    }

    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        self.resolver.is_date_disabled(date, self.clock.today())
    }

    pub fn disabled_dates(&self) -> BTreeSet<NaiveDate> {
        self.resolver.disabled_dates(self.clock.today())
    }

    /// Start times offered for the drafted date right now
    pub fn selectable_times(&self) -> Vec<NaiveTime> {
        self.resolver.selectable_times(self.draft.date(), self.clock.now())
    }

    /// Clear a chosen time that is no longer selectable (sold out, elapsed,
    /// or date now disabled) and send the user back to pick another.
    /// Returns whether anything changed.
    pub fn reconcile_selection(&mut self) -> bool {
        let Some(time) = self.draft.time() else {
            return false;
        };
        if self.resolver.is_selectable(self.draft.date(), time, self.clock.now()) {
            return false;
        }

        debug!("Clearing stale time {} on {}", time, self.draft.date());
        self.draft = self.draft.without_time();
        if self.is_open() {
            self.step = BookingStep::Schedule;
            self.phase = if self.is_date_disabled(self.draft.date()) {
                SchedulePhase::ChoosingDate
            } else {
                SchedulePhase::ChoosingTime
            };
        }
        self.reprice();
        true
    }

    // ========================================================================
    // Draft mutations
    // ========================================================================

    /// Apply a user mutation. Returns `false` and leaves the draft untouched
    /// when the action is not valid against current availability or the
    /// add-on catalog.
    pub fn dispatch(&mut self, action: DraftAction) -> bool {
        if !self.is_open() {
            return false;
        }

        let accepted = match &action {
            DraftAction::SelectDate(date) => !self.is_date_disabled(*date),
            DraftAction::SelectTime(time) => self.selectable_times().contains(time),
            DraftAction::SelectAddOn { id, time } => self
                .add_ons
                .get(id)
                .is_some_and(|add_on| add_on.offers(*time)),
            DraftAction::IncrementAdults
            | DraftAction::DecrementAdults
            | DraftAction::IncrementChildren
            | DraftAction::DecrementChildren
            | DraftAction::ClearAddOn => true,
        };
        if !accepted {
            debug!("Rejected draft action {:?}", action);
            return false;
        }

        if let DraftAction::SelectDate(_) = action {
            self.phase = SchedulePhase::ChoosingTime;
        }
        self.draft = self.draft.apply(&action);
        self.reprice();
        true
    }

    /// Return to the calendar without changing the drafted date
    pub fn choose_another_date(&mut self) {
        if self.step == BookingStep::Schedule {
            self.phase = SchedulePhase::ChoosingDate;
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn can_advance(&self) -> bool {
        match self.step {
            BookingStep::Schedule => self.schedule_complete(),
            BookingStep::Party | BookingStep::AddOns => true,
            BookingStep::Review | BookingStep::Closed => false,
        }
    }

    /// Move to the next step. Returns `false` when the current step's
    /// precondition does not hold.
    pub fn advance(&mut self) -> bool {
        if self.step == BookingStep::Schedule {
            self.reconcile_selection();
        }
        if !self.can_advance() {
            return false;
        }

        let next = match self.step {
            BookingStep::Schedule => BookingStep::Party,
            BookingStep::Party => BookingStep::AddOns,
            BookingStep::AddOns => BookingStep::Review,
            BookingStep::Review | BookingStep::Closed => return false,
        };
        debug!("Booking flow {:?} -> {:?}", self.step, next);
        self.step = next;
        true
    }

    pub fn back(&mut self) -> bool {
        let previous = match self.step {
            BookingStep::Party => BookingStep::Schedule,
            BookingStep::AddOns => BookingStep::Party,
            BookingStep::Review => BookingStep::AddOns,
            BookingStep::Schedule | BookingStep::Closed => return false,
        };
        if previous == BookingStep::Schedule {
            self.phase = SchedulePhase::ChoosingTime;
        }
        self.step = previous;
        true
    }

    fn schedule_complete(&self) -> bool {
        match self.draft.time() {
            Some(time) => self.resolver.is_selectable(self.draft.date(), time, self.clock.now()),
            None => false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn phase(&self) -> SchedulePhase {
        self.phase
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn price(&self) -> &PriceBreakdown {
        &self.price
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn add_ons(&self) -> &AddOnCatalog {
        &self.add_ons
    }

    fn reprice(&mut self) {
        let mut request = PricingRequest::new(
            self.resource.effective_fare(),
            self.draft.adults(),
            self.draft.children(),
        );
        if let Some(id) = self.draft.add_on_id() {
            request = request.with_add_on(id);
        }
        self.price = self.pricing.compute(&request, &self.add_ons);
    }
}
