pub mod draft;
pub mod flow;
pub mod handoff;
pub mod resolver;

pub use draft::{BookingDraft, DraftAction};
pub use trek_catalog::AddOnSelection;
pub use flow::{BookingFlow, BookingStep, Reservation, SchedulePhase};
pub use handoff::{line_items, HandoffError, HandoffIntent, HandoffReceipt, ReservationHandoff};
pub use resolver::{ApplyOutcome, AvailabilityResolver, AvailabilityStatus, MonthRequest};
