use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use std::sync::Arc;
use trek_catalog::{AddOnCatalog, AddOnSelection, PriceBreakdown, PricingEngine, Resource};
use trek_core::{
    BookingReference, BookingStore, BookingStoreError, CustomerRef, NewCustomer, OperatorBookingRecord,
    PaymentBlock, PaymentMethod, PaymentStatus, PricingBlock, ScheduleBlock,
};
use uuid::Uuid;

use crate::rules::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorStep {
    Resource,
    Customer,
    ScheduleParty,
    PaymentReview,
}

impl OperatorStep {
    fn next(self) -> Option<Self> {
        match self {
            OperatorStep::Resource => Some(OperatorStep::Customer),
            OperatorStep::Customer => Some(OperatorStep::ScheduleParty),
            OperatorStep::ScheduleParty => Some(OperatorStep::PaymentReview),
            OperatorStep::PaymentReview => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            OperatorStep::Resource => None,
            OperatorStep::Customer => Some(OperatorStep::Resource),
            OperatorStep::ScheduleParty => Some(OperatorStep::Customer),
            OperatorStep::PaymentReview => Some(OperatorStep::ScheduleParty),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] BookingStoreError),
}

/// Staff-side booking wizard.
///
/// Builds an `OperatorBookingRecord` over four steps and prices it with the
/// same calculator as the storefront, under the operator fee policy.
#[derive(Debug, Clone)]
pub struct OperatorDraftBuilder {
    step: OperatorStep,
    resource: Option<Resource>,
    variant_id: Option<String>,
    customer: Option<CustomerRef>,
    schedule: ScheduleBlock,
    add_on: Option<AddOnSelection>,
    payment: PaymentBlock,
    manual_total: Option<Decimal>,
    notes: String,
    pricing: PricingEngine,
    add_ons: Arc<AddOnCatalog>,
    breakdown: PriceBreakdown,
}

impl OperatorDraftBuilder {
    pub fn new(pricing: PricingEngine) -> Self {
        Self {
            step: OperatorStep::Resource,
            resource: None,
            variant_id: None,
            customer: None,
            schedule: ScheduleBlock::default(),
            add_on: None,
            payment: PaymentBlock::default(),
            manual_total: None,
            notes: String::new(),
            pricing,
            add_ons: Arc::new(AddOnCatalog::default()),
            breakdown: PriceBreakdown::default(),
        }
    }

    /// Sell add-ons from another catalog than the storefront default
    pub fn with_add_ons(mut self, add_ons: Arc<AddOnCatalog>) -> Self {
        self.add_ons = add_ons;
        self.add_on = None;
        self.reprice();
        self
    }

    // ========================================================================
    // Resource step
    // ========================================================================

    /// Pick the tour. A single variant is chosen automatically; several
    /// variants must be chosen explicitly.
    pub fn select_resource(&mut self, resource: Resource) {
        self.variant_id = match resource.variants.as_slice() {
            [only] => Some(only.id.clone()),
            _ => None,
        };
        self.resource = Some(resource);
        self.reprice();
    }

    pub fn select_variant(&mut self, variant_id: &str) -> Result<(), ValidationError> {
        let resource = self.resource.as_ref().ok_or(ValidationError::MissingResource)?;
        if resource.variant(variant_id).is_none() {
            return Err(ValidationError::UnknownVariant(variant_id.to_string()));
        }
        self.variant_id = Some(variant_id.to_string());
        self.reprice();
        Ok(())
    }

    // ========================================================================
    // Customer step
    // ========================================================================

    pub fn select_existing_customer(&mut self, customer_id: Uuid) {
        self.customer = Some(CustomerRef::Existing { customer_id });
    }

    pub fn enter_new_customer(&mut self, customer: NewCustomer) {
        self.customer = Some(CustomerRef::New(customer));
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    // ========================================================================
    // Schedule and party step
    // ========================================================================

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.schedule.date = date;
    }

    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        self.schedule.time = time;
    }

    pub fn set_party(&mut self, adults: u32, children: u32, infants: u32) {
        self.schedule.adults = adults;
        self.schedule.children = children;
        self.schedule.infants = infants;
        self.reprice();
    }

    /// Attach an add-on at one of its offered times
    pub fn select_add_on(&mut self, id: &str, time: NaiveTime) -> Result<(), ValidationError> {
        let selection = AddOnSelection::new(id, time);
        rules::check_add_on(&self.add_ons, Some(&selection))?;
        self.add_on = Some(selection);
        self.reprice();
        Ok(())
    }

    pub fn clear_add_on(&mut self) {
        self.add_on = None;
        self.reprice();
    }

    // ========================================================================
    // Payment and review step
    // ========================================================================

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment.method = method;
    }

    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        self.payment.status = status;
    }

    /// Override the computed total; `None` goes back to the computed price
    pub fn set_manual_total(&mut self, total: Option<Decimal>) {
        self.manual_total = total;
        self.reprice();
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.notes = notes.to_string();
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Check the current step's preconditions
    pub fn check_step(&self) -> Result<(), ValidationError> {
        match self.step {
            OperatorStep::Resource => {
                rules::check_resource(self.resource.as_ref(), self.variant_id.as_deref()).map(|_| ())
            }
            OperatorStep::Customer => rules::check_customer(self.customer.as_ref()),
            OperatorStep::ScheduleParty => {
                rules::check_schedule(&self.record())?;
                rules::check_add_on(&self.add_ons, self.add_on.as_ref())
            }
            OperatorStep::PaymentReview => Ok(()),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.step.next().is_some() && self.check_step().is_ok()
    }

    /// Move to the next step once the current one is complete. Returns the
    /// step the builder is on afterwards.
    pub fn advance(&mut self) -> Result<OperatorStep, ValidationError> {
        self.check_step()?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Jump back to an earlier step to edit it
    pub fn go_to(&mut self, step: OperatorStep) -> bool {
        if step > self.step {
            return false;
        }
        self.step = step;
        true
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Snapshot of everything entered so far
    pub fn record(&self) -> OperatorBookingRecord {
        OperatorBookingRecord {
            resource_id: self.resource.as_ref().map(|r| r.id),
            variant_id: self.variant_id.clone(),
            customer: self.customer.clone(),
            schedule: self.schedule.clone(),
            add_on: self.add_on.clone(),
            pricing: PricingBlock {
                fare: self.fare().unwrap_or_default(),
                breakdown: self.breakdown.clone(),
                manual_total: self.manual_total,
            },
            payment: self.payment.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Validate everything and persist. On a validation error the builder
    /// moves to the step that needs fixing; on a store error it stays as is.
    /// A successful submission starts a fresh draft.
    pub async fn submit(&mut self, store: &dyn BookingStore) -> Result<BookingReference, SubmitError> {
        let record = self.record();
        if let Err(e) = rules::validate_record(&record, self.resource.as_ref(), &self.add_ons) {
            warn!("Operator booking incomplete: {}", e);
            self.step = e.step();
            return Err(e.into());
        }

        match store.create_booking(&record).await {
            Ok(reference) => {
                info!(
                    "Operator booking {} created, amount due {}",
                    reference,
                    record.pricing.amount_due()
                );
                let add_ons = Arc::clone(&self.add_ons);
                *self = Self::new(self.pricing.clone()).with_add_ons(add_ons);
                Ok(reference)
            }
            Err(e) => {
                warn!("Operator booking rejected: {}", e);
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn step(&self) -> OperatorStep {
        self.step
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn variant_id(&self) -> Option<&str> {
        self.variant_id.as_deref()
    }

    pub fn customer(&self) -> Option<&CustomerRef> {
        self.customer.as_ref()
    }

    pub fn schedule(&self) -> &ScheduleBlock {
        &self.schedule
    }

    pub fn add_on(&self) -> Option<&AddOnSelection> {
        self.add_on.as_ref()
    }

    pub fn payment(&self) -> &PaymentBlock {
        &self.payment
    }

    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    /// Fare of the chosen variant, or the flat fare; `None` until resolvable
    pub fn fare(&self) -> Option<Decimal> {
        rules::check_resource(self.resource.as_ref(), self.variant_id.as_deref()).ok()
    }

    fn reprice(&mut self) {
        self.breakdown = match self.fare() {
            Some(fare) => rules::price_record(&self.pricing, fare, &self.record(), &self.add_ons),
            None => PriceBreakdown::default(),
        };
    }
}

impl Default for OperatorDraftBuilder {
    fn default() -> Self {
        Self::new(PricingEngine::operator())
    }
}
