pub mod resource;
pub mod addon;
pub mod pricing;

pub use resource::{CatalogError, FareVariant, Resource, ResourceId};
pub use addon::{AddOn, AddOnCatalog, AddOnSelection};
pub use pricing::{FeePolicy, PriceBreakdown, PricingEngine, PricingRequest};
