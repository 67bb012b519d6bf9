use async_trait::async_trait;
use trek_catalog::{Resource, ResourceId};

use crate::availability::{AvailabilityError, MonthAvailability, YearMonth};
use crate::booking::{BookingReference, OperatorBookingRecord};
use crate::cart::LineItem;

/// Read access to the tour catalog
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_resource(
        &self,
        id: ResourceId,
    ) -> Result<Option<Resource>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Scheduling service answering month availability queries
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn month_availability(
        &self,
        resource_id: ResourceId,
        month: YearMonth,
    ) -> Result<MonthAvailability, AvailabilityError>;
}

/// Append-only cart; each call is one independent emission
#[async_trait]
pub trait CartBoundary: Send + Sync {
    async fn add_line_item(&self, item: &LineItem) -> Result<(), CartError>;
}

#[async_trait]
pub trait CheckoutBoundary: Send + Sync {
    async fn enter_checkout(&self) -> Result<(), CartError>;
}

/// Persistence for staff-entered bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_booking(
        &self,
        record: &OperatorBookingRecord,
    ) -> Result<BookingReference, BookingStoreError>;
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum CartError {
    #[error("Cart rejected item: {0}")]
    Rejected(String),

    #[error("Cart unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum BookingStoreError {
    /// Reason reported by the booking service, shown to the operator as-is
    #[error("{0}")]
    Rejected(String),

    #[error("Booking service unreachable: {0}")]
    Unreachable(String),

    #[error("Booking store failure: {0}")]
    Internal(String),
}
