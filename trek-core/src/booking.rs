use chrono::{NaiveDate, NaiveTime};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use trek_catalog::{AddOnSelection, PriceBreakdown, ResourceId};

use crate::identity::CustomerRef;
use crate::payment::PaymentBlock;

// ============================================================================
// Operator Booking Record
// ============================================================================

/// Date, time and party of an operator booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub date: Option<NaiveDate>,
    #[serde(with = "trek_shared::time::option", default)]
    pub time: Option<NaiveTime>,
    pub adults: u32,
    pub children: u32,
    /// Tracked for the manifest, never priced
    #[serde(default)]
    pub infants: u32,
}

impl ScheduleBlock {
    /// Largest headcount accepted for any one guest category
    pub const MAX_PER_CATEGORY: u32 = 100;

    /// Priced guests; infants are excluded.
    pub fn guests(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    pub fn exceeds_capacity(&self) -> bool {
        [self.adults, self.children, self.infants]
            .iter()
            .any(|count| *count > Self::MAX_PER_CATEGORY)
    }
}

impl Default for ScheduleBlock {
    fn default() -> Self {
        Self {
            date: None,
            time: None,
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PricingBlock {
    /// Adult fare the breakdown was computed from
    pub fare: Decimal,
    pub breakdown: PriceBreakdown,
    /// Operator "custom price"; authoritative when present
    #[serde(default)]
    pub manual_total: Option<Decimal>,
}

impl PricingBlock {
    /// Amount the customer owes
    pub fn amount_due(&self) -> Decimal {
        self.manual_total.unwrap_or(self.breakdown.total)
    }
}

/// Payload of `POST /bookings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorBookingRecord {
    pub resource_id: Option<ResourceId>,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub customer: Option<CustomerRef>,
    pub schedule: ScheduleBlock,
    /// Optional add-on, priced per adult like on the storefront
    #[serde(default)]
    pub add_on: Option<AddOnSelection>,
    pub pricing: PricingBlock,
    pub payment: PaymentBlock,
    #[serde(default)]
    pub notes: String,
}

// ============================================================================
// Booking Reference
// ============================================================================

/// Operator-facing booking reference, e.g. `TRK-7QK2M9XD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    pub const PREFIX: &'static str = "TRK-";

    pub fn generate() -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|c| char::from(c).to_ascii_uppercase())
            .collect();
        Self(format!("{}{}", Self::PREFIX, code))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
