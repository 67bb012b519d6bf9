use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ResourceId = Uuid;

/// A structured booking option on a tour (e.g. "Private boat", "Shared boat")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareVariant {
    pub id: String,
    pub label: String,
    pub fare: Decimal,
    pub duration: Option<String>,
}

impl FareVariant {
    pub fn new(id: &str, label: &str, fare: Decimal) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            fare,
            duration: None,
        }
    }
}

/// A bookable tour as read from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    /// Discounted adult fare used when the tour has no variants
    pub fare: Decimal,
    /// Undiscounted list price, display only
    pub list_price: Option<Decimal>,
    #[serde(default)]
    pub variants: Vec<FareVariant>,
    pub duration: Option<String>,
    pub media_ref: Option<String>,
}

impl Resource {
    pub fn new(title: &str, fare: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            fare,
            list_price: None,
            variants: Vec::new(),
            duration: None,
            media_ref: None,
        }
    }

    pub fn with_variant(mut self, variant: FareVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Base fare for self-service pricing: the cheapest variant when variants
    /// exist, the flat fare otherwise.
    pub fn effective_fare(&self) -> Decimal {
        self.variants
            .iter()
            .map(|v| v.fare)
            .min()
            .unwrap_or(self.fare)
    }

    pub fn variant(&self, variant_id: &str) -> Option<&FareVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// More than one variant means the operator has to pick one explicitly.
    pub fn requires_variant_choice(&self) -> bool {
        self.variants.len() > 1
    }

    /// Fare for a specific variant choice.
    pub fn fare_for(&self, variant_id: Option<&str>) -> Result<Decimal, CatalogError> {
        match (variant_id, self.variants.as_slice()) {
            (Some(id), _) => self
                .variant(id)
                .map(|v| v.fare)
                .ok_or_else(|| CatalogError::VariantNotFound(id.to_string())),
            (None, []) => Ok(self.fare),
            (None, [only]) => Ok(only.fare),
            (None, _) => Err(CatalogError::VariantRequired(self.title.clone())),
        }
    }

    /// Percentage off the list price, when a list price is set above the fare.
    pub fn discount_percentage(&self) -> Option<Decimal> {
        let list = self.list_price?;
        let fare = self.effective_fare();
        if list <= fare || list.is_zero() {
            return None;
        }
        Some(((list - fare) / list * Decimal::ONE_HUNDRED).round())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Fare variant not found: {0}")]
    VariantNotFound(String),

    #[error("A fare variant must be chosen for {0}")]
    VariantRequired(String),

    #[error("Add-on not found: {0}")]
    AddOnNotFound(String),

    #[error("Add-on {0} does not run at the chosen time")]
    AddOnTimeNotOffered(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn boat_tour() -> Resource {
        Resource::new("Island Hopping", dec!(120))
            .with_variant(FareVariant::new("shared", "Shared boat", dec!(95)))
            .with_variant(FareVariant::new("private", "Private boat", dec!(180)))
    }

    #[test]
    fn test_effective_fare_is_cheapest_variant() {
        assert_eq!(boat_tour().effective_fare(), dec!(95));
    }

    #[test]
    fn test_effective_fare_without_variants_is_flat_fare() {
        let tour = Resource::new("Old Town Walk", dec!(40));
        assert_eq!(tour.effective_fare(), dec!(40));
    }

    #[test]
    fn test_fare_for_variant_choice() {
        let tour = boat_tour();
        assert_eq!(tour.fare_for(Some("private")), Ok(dec!(180)));
        assert_eq!(
            tour.fare_for(Some("sunset")),
            Err(CatalogError::VariantNotFound("sunset".to_string()))
        );
        assert_eq!(
            tour.fare_for(None),
            Err(CatalogError::VariantRequired("Island Hopping".to_string()))
        );
    }

    #[test]
    fn test_single_variant_needs_no_choice() {
        let tour = Resource::new("Canyon Hike", dec!(60))
            .with_variant(FareVariant::new("std", "Standard", dec!(55)));
        assert!(!tour.requires_variant_choice());
        assert_eq!(tour.fare_for(None), Ok(dec!(55)));
    }

    #[test]
    fn test_discount_percentage() {
        let mut tour = Resource::new("Old Town Walk", dec!(75));
        assert_eq!(tour.discount_percentage(), None);

        tour.list_price = Some(dec!(100));
        assert_eq!(tour.discount_percentage(), Some(dec!(25)));
    }
}
