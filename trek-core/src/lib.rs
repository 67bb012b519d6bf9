pub mod availability;
pub mod booking;
pub mod cart;
pub mod clock;
pub mod identity;
pub mod payment;
pub mod repository;

pub use availability::{AvailabilityError, MonthAvailability, Slot, YearMonth};
pub use booking::{BookingReference, OperatorBookingRecord, PricingBlock, ScheduleBlock};
pub use cart::{LineItem, LineItemKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{CustomerRef, NewCustomer};
pub use payment::{PaymentBlock, PaymentMethod, PaymentStatus};
pub use repository::{AvailabilityService, BookingStore, BookingStoreError, CartBoundary, CartError, CatalogReader, CheckoutBoundary};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
