use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trek_shared::round_currency;

use crate::addon::AddOnCatalog;

/// Children pay half the adult fare. Fixed policy, not configurable per tour.
pub const CHILD_FARE_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Fee and tax rates applied on top of the subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Service fee as a fraction of the subtotal (0.03 = 3%)
    pub service_fee_rate: Decimal,

    /// Tax as a fraction of the subtotal
    pub tax_rate: Decimal,
}

impl FeePolicy {
    /// Storefront checkout: no fee, no tax.
    pub fn self_service() -> Self {
        Self {
            service_fee_rate: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
        }
    }

    /// Staff-entered bookings: 3% service fee and 5% tax.
    pub fn operator() -> Self {
        Self {
            service_fee_rate: Decimal::new(3, 2),
            tax_rate: Decimal::new(5, 2),
        }
    }

    pub fn charges_fees(&self) -> bool {
        !self.service_fee_rate.is_zero() || !self.tax_rate.is_zero()
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::self_service()
    }
}

/// Everything the price depends on
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRequest<'a> {
    /// Adult fare of the tour (or of the chosen variant)
    pub fare: Decimal,
    pub adults: u32,
    pub children: u32,
    pub add_on_id: Option<&'a str>,
    /// Operator "custom price"; replaces the computed total when present
    pub manual_total: Option<Decimal>,
}

impl<'a> PricingRequest<'a> {
    pub fn new(fare: Decimal, adults: u32, children: u32) -> Self {
        Self {
            fare,
            adults,
            children,
            add_on_id: None,
            manual_total: None,
        }
    }

    pub fn with_add_on(mut self, add_on_id: &'a str) -> Self {
        self.add_on_id = Some(add_on_id);
        self
    }

    pub fn with_manual_total(mut self, total: Decimal) -> Self {
        self.manual_total = Some(total);
        self
    }
}

/// Decomposed price of a reservation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub add_on_fare: Decimal,
    pub service_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// When set, `total` is a manual value and the other lines are informational
    #[serde(default)]
    pub overridden: bool,
}

impl PriceBreakdown {
    /// Display copy with every line rounded to cents.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_currency(self.subtotal),
            add_on_fare: round_currency(self.add_on_fare),
            service_fee: round_currency(self.service_fee),
            tax: round_currency(self.tax),
            total: round_currency(self.total),
            overridden: self.overridden,
        }
    }
}

/// Pure price calculator shared by the storefront and operator flows
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    policy: FeePolicy,
}

impl PricingEngine {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    pub fn self_service() -> Self {
        Self::new(FeePolicy::self_service())
    }

    pub fn operator() -> Self {
        Self::new(FeePolicy::operator())
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    /// Adult line plus child line
    pub fn subtotal(&self, fare: Decimal, adults: u32, children: u32) -> Decimal {
        let adult_line = fare * Decimal::from(adults);
        let child_line = fare * CHILD_FARE_RATIO * Decimal::from(children);
        adult_line + child_line
    }

    /// Add-on fare scales with adults only. Ids missing from the catalog
    /// contribute nothing; callers validate selections against the catalog.
    pub fn add_on_fare(&self, catalog: &AddOnCatalog, add_on_id: Option<&str>, adults: u32) -> Decimal {
        add_on_id
            .and_then(|id| catalog.fare_of(id))
            .map(|fare| fare * Decimal::from(adults))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn compute(&self, request: &PricingRequest<'_>, catalog: &AddOnCatalog) -> PriceBreakdown {
        let subtotal = self.subtotal(request.fare, request.adults, request.children);
        let add_on_fare = self.add_on_fare(catalog, request.add_on_id, request.adults);

        // Fee and tax are rounded to cents before they enter the total
        let service_fee = round_currency(subtotal * self.policy.service_fee_rate);
        let tax = round_currency(subtotal * self.policy.tax_rate);

        let computed_total = subtotal + add_on_fare + service_fee + tax;

        match request.manual_total {
            Some(manual) => PriceBreakdown {
                subtotal,
                add_on_fare,
                service_fee,
                tax,
                total: manual,
                overridden: true,
            },
            None => PriceBreakdown {
                subtotal,
                add_on_fare,
                service_fee,
                tax,
                total: computed_total,
                overridden: false,
            },
        }
    }
}
