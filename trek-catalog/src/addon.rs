use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::resource::CatalogError;

/// An optional bolt-on experience sold next to a tour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddOn {
    pub id: String,
    pub title: String,
    pub duration: String,
    /// Fare per adult
    pub fare: Decimal,
    /// Offered start times, independent of the tour's own availability
    #[serde(with = "trek_shared::time::list")]
    pub times: Vec<NaiveTime>,
}

impl AddOn {
    pub fn offers(&self, time: NaiveTime) -> bool {
        self.times.contains(&time)
    }
}

/// An add-on picked for a booking. The start time is part of the choice, so
/// an id never travels without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnSelection {
    pub id: String,
    #[serde(with = "trek_shared::time")]
    pub time: NaiveTime,
}

impl AddOnSelection {
    pub fn new(id: &str, time: NaiveTime) -> Self {
        Self {
            id: id.to_string(),
            time,
        }
    }
}

/// Static lookup of add-ons keyed by id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddOnCatalog {
    entries: BTreeMap<String, AddOn>,
}

impl AddOnCatalog {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register an add-on; replaces an existing entry with the same id.
    pub fn insert(&mut self, add_on: AddOn) {
        self.entries.insert(add_on.id.clone(), add_on);
    }

    pub fn with(mut self, add_on: AddOn) -> Self {
        self.insert(add_on);
        self
    }

    pub fn get(&self, id: &str) -> Option<&AddOn> {
        self.entries.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&AddOn, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::AddOnNotFound(id.to_string()))
    }

    /// The add-on behind a selection, if it exists and runs at the chosen time
    pub fn resolve(&self, selection: &AddOnSelection) -> Result<&AddOn, CatalogError> {
        let add_on = self.require(&selection.id)?;
        if add_on.offers(selection.time) {
            Ok(add_on)
        } else {
            Err(CatalogError::AddOnTimeNotOffered(selection.id.clone()))
        }
    }

    pub fn fare_of(&self, id: &str) -> Option<Decimal> {
        self.get(id).map(|a| a.fare)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddOn> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AddOnCatalog {
    /// The two add-ons the storefront sells today.
    fn default() -> Self {
        let at = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();

        Self::new()
            .with(AddOn {
                id: "sunset-cruise".to_string(),
                title: "Sunset Cruise".to_string(),
                duration: "2 hours".to_string(),
                fare: Decimal::new(25, 0),
                times: vec![at(17, 0), at(18, 0)],
            })
            .with(AddOn {
                id: "food-tasting".to_string(),
                title: "Street Food Tasting".to_string(),
                duration: "3 hours".to_string(),
                fare: Decimal::new(45, 0),
                times: vec![at(11, 30), at(13, 0), at(19, 30)],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_catalog_has_both_add_ons() {
        let catalog = AddOnCatalog::default();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.fare_of("sunset-cruise"), Some(dec!(25)));
        assert_eq!(catalog.fare_of("food-tasting"), Some(dec!(45)));
    }

    #[test]
    fn test_new_add_ons_are_additive() {
        let mut catalog = AddOnCatalog::default();
        catalog.insert(AddOn {
            id: "photo-pack".to_string(),
            title: "Photo Pack".to_string(),
            duration: "1 hour".to_string(),
            fare: dec!(15),
            times: vec![NaiveTime::from_hms_opt(10, 0, 0).unwrap()],
        });

        assert_eq!(catalog.len(), 3);
        assert!(catalog.require("photo-pack").is_ok());
        assert_eq!(
            catalog.require("balloon"),
            Err(CatalogError::AddOnNotFound("balloon".to_string()))
        );
    }

    #[test]
    fn test_add_on_offered_times() {
        let catalog = AddOnCatalog::default();
        let cruise = catalog.get("sunset-cruise").unwrap();
        assert!(cruise.offers(NaiveTime::from_hms_opt(17, 0, 0).unwrap()));
        assert!(!cruise.offers(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    }

    #[test]
    fn test_resolve_checks_id_and_time() {
        let catalog = AddOnCatalog::default();
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        let cruise = catalog.resolve(&AddOnSelection::new("sunset-cruise", at(18, 0))).unwrap();
        assert_eq!(cruise.fare, dec!(25));
        assert_eq!(
            catalog.resolve(&AddOnSelection::new("sunset-cruise", at(11, 30))),
            Err(CatalogError::AddOnTimeNotOffered("sunset-cruise".to_string()))
        );
        assert_eq!(
            catalog.resolve(&AddOnSelection::new("balloon", at(17, 0))),
            Err(CatalogError::AddOnNotFound("balloon".to_string()))
        );
    }

    #[test]
    fn test_selection_wire_time() {
        let selection = AddOnSelection::new("food-tasting", NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["time"], "11:30");

        let back: AddOnSelection = serde_json::from_value(json).unwrap();
        assert_eq!(back, selection);

        // A selection without a time is not a selection
        assert!(serde_json::from_str::<AddOnSelection>(r#"{"id":"food-tasting"}"#).is_err());
    }
}
