use rust_decimal::Decimal;
use trek_catalog::{
    AddOnCatalog, AddOnSelection, CatalogError, PriceBreakdown, PricingEngine, PricingRequest, Resource,
};
use trek_core::{CustomerRef, OperatorBookingRecord, ScheduleBlock};

use crate::builder::OperatorStep;

/// A precondition an operator booking failed. Each maps to the step where
/// the operator can fix it.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No tour selected")]
    MissingResource,

    #[error("Choose a variant for {0}")]
    MissingVariant(String),

    #[error("Variant not found: {0}")]
    UnknownVariant(String),

    #[error("No customer selected")]
    MissingCustomer,

    #[error("Customer details incomplete: {}", .0.join(", "))]
    MissingCustomerFields(Vec<&'static str>),

    #[error("No date selected")]
    MissingDate,

    #[error("At least one adult or child is required")]
    NoGuests,

    #[error("At most {0} guests per category can be booked at once")]
    PartyTooLarge(u32),

    #[error("Add-on not found: {0}")]
    UnknownAddOn(String),

    #[error("Add-on {0} does not run at the chosen time")]
    AddOnTimeNotOffered(String),
}

impl ValidationError {
    pub fn step(&self) -> OperatorStep {
        match self {
            ValidationError::MissingResource
            | ValidationError::MissingVariant(_)
            | ValidationError::UnknownVariant(_) => OperatorStep::Resource,
            ValidationError::MissingCustomer | ValidationError::MissingCustomerFields(_) => {
                OperatorStep::Customer
            }
            ValidationError::MissingDate
            | ValidationError::NoGuests
            | ValidationError::PartyTooLarge(_)
            | ValidationError::UnknownAddOn(_)
            | ValidationError::AddOnTimeNotOffered(_) => OperatorStep::ScheduleParty,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingResource => "MISSING_RESOURCE",
            ValidationError::MissingVariant(_) => "MISSING_VARIANT",
            ValidationError::UnknownVariant(_) => "UNKNOWN_VARIANT",
            ValidationError::MissingCustomer => "MISSING_CUSTOMER",
            ValidationError::MissingCustomerFields(_) => "MISSING_CUSTOMER_FIELDS",
            ValidationError::MissingDate => "MISSING_DATE",
            ValidationError::NoGuests => "NO_GUESTS",
            ValidationError::PartyTooLarge(_) => "PARTY_TOO_LARGE",
            ValidationError::UnknownAddOn(_) => "UNKNOWN_ADD_ON",
            ValidationError::AddOnTimeNotOffered(_) => "ADD_ON_TIME_NOT_OFFERED",
        }
    }
}

/// Resolve the fare the booking is priced from.
pub fn check_resource(
    resource: Option<&Resource>,
    variant_id: Option<&str>,
) -> Result<Decimal, ValidationError> {
    let resource = resource.ok_or(ValidationError::MissingResource)?;
    resource.fare_for(variant_id).map_err(|e| match e {
        CatalogError::VariantNotFound(id) => ValidationError::UnknownVariant(id),
        _ => ValidationError::MissingVariant(resource.title.clone()),
    })
}

pub fn check_customer(customer: Option<&CustomerRef>) -> Result<(), ValidationError> {
    match customer {
        None => Err(ValidationError::MissingCustomer),
        Some(CustomerRef::Existing { .. }) => Ok(()),
        Some(CustomerRef::New(details)) => {
            let missing = details.missing_fields();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::MissingCustomerFields(missing))
            }
        }
    }
}

pub fn check_schedule(record: &OperatorBookingRecord) -> Result<(), ValidationError> {
    if record.schedule.date.is_none() {
        return Err(ValidationError::MissingDate);
    }
    if record.schedule.exceeds_capacity() {
        return Err(ValidationError::PartyTooLarge(ScheduleBlock::MAX_PER_CATEGORY));
    }
    if record.schedule.guests() == 0 {
        return Err(ValidationError::NoGuests);
    }
    Ok(())
}

/// An add-on is optional, but when present it must exist and run at the
/// chosen time.
pub fn check_add_on(
    add_ons: &AddOnCatalog,
    selection: Option<&AddOnSelection>,
) -> Result<(), ValidationError> {
    let Some(selection) = selection else {
        return Ok(());
    };
    add_ons.resolve(selection).map(|_| ()).map_err(|e| match e {
        CatalogError::AddOnTimeNotOffered(id) => ValidationError::AddOnTimeNotOffered(id),
        _ => ValidationError::UnknownAddOn(selection.id.clone()),
    })
}

/// Every submission precondition, checked in step order. `resource` is the
/// catalog entry for `record.resource_id`, if one was found. Returns the
/// fare the booking is priced from.
pub fn validate_record(
    record: &OperatorBookingRecord,
    resource: Option<&Resource>,
    add_ons: &AddOnCatalog,
) -> Result<Decimal, ValidationError> {
    let resource = match (record.resource_id, resource) {
        (Some(id), Some(resource)) if resource.id == id => Some(resource),
        _ => None,
    };
    let fare = check_resource(resource, record.variant_id.as_deref())?;
    check_customer(record.customer.as_ref())?;
    check_schedule(record)?;
    check_add_on(add_ons, record.add_on.as_ref())?;
    Ok(fare)
}

/// Price an operator booking with the same calculator as the storefront.
/// Infants are never priced.
pub fn price_record(
    engine: &PricingEngine,
    fare: Decimal,
    record: &OperatorBookingRecord,
    add_ons: &AddOnCatalog,
) -> PriceBreakdown {
    let mut request = PricingRequest::new(fare, record.schedule.adults, record.schedule.children);
    if let Some(selection) = &record.add_on {
        request = request.with_add_on(&selection.id);
    }
    if let Some(total) = record.pricing.manual_total {
        request = request.with_manual_total(total);
    }
    engine.compute(&request, add_ons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;
    use trek_catalog::FareVariant;
    use trek_core::{NewCustomer, PaymentBlock, PricingBlock, ScheduleBlock};
    use uuid::Uuid;

    fn resource() -> Resource {
        Resource::new("Harbour Kayak Tour", dec!(100))
    }

    fn record(resource: &Resource) -> OperatorBookingRecord {
        OperatorBookingRecord {
            resource_id: Some(resource.id),
            variant_id: None,
            customer: Some(CustomerRef::Existing {
                customer_id: Uuid::new_v4(),
            }),
            schedule: ScheduleBlock {
                date: NaiveDate::from_ymd_opt(2026, 11, 2),
                adults: 2,
                children: 1,
                ..Default::default()
            },
            add_on: None,
            pricing: PricingBlock::default(),
            payment: PaymentBlock::default(),
            notes: String::new(),
        }
    }

    fn validate(
        record: &OperatorBookingRecord,
        resource: Option<&Resource>,
    ) -> Result<Decimal, ValidationError> {
        validate_record(record, resource, &AddOnCatalog::default())
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_valid_record_yields_fare() {
        let resource = resource();
        assert_eq!(validate(&record(&resource), Some(&resource)), Ok(dec!(100)));
    }

    #[test]
    fn test_resource_checks() {
        let resource = resource();
        let mut booking = record(&resource);

        assert_eq!(validate(&booking, None), Err(ValidationError::MissingResource));

        // Catalog entry for a different tour
        let other = Resource::new("Reef Snorkel", dec!(80));
        assert_eq!(validate(&booking, Some(&other)), Err(ValidationError::MissingResource));

        booking.resource_id = None;
        assert_eq!(validate(&booking, Some(&resource)), Err(ValidationError::MissingResource));
    }

    #[test]
    fn test_multi_variant_resource_requires_choice() {
        let resource = resource()
            .with_variant(FareVariant::new("shared", "Shared boat", dec!(90)))
            .with_variant(FareVariant::new("private", "Private boat", dec!(300)));
        let mut booking = record(&resource);

        let err = validate(&booking, Some(&resource)).unwrap_err();
        assert!(matches!(err, ValidationError::MissingVariant(_)));
        assert_eq!(err.step(), OperatorStep::Resource);

        booking.variant_id = Some("yacht".to_string());
        assert_eq!(
            validate(&booking, Some(&resource)),
            Err(ValidationError::UnknownVariant("yacht".to_string()))
        );

        booking.variant_id = Some("private".to_string());
        assert_eq!(validate(&booking, Some(&resource)), Ok(dec!(300)));
    }

    #[test]
    fn test_customer_checks() {
        let resource = resource();
        let mut booking = record(&resource);

        booking.customer = None;
        let err = validate(&booking, Some(&resource)).unwrap_err();
        assert_eq!(err, ValidationError::MissingCustomer);
        assert_eq!(err.step(), OperatorStep::Customer);

        booking.customer = Some(CustomerRef::New(NewCustomer::new("Ana", "", "ana.example.com")));
        assert_eq!(
            validate(&booking, Some(&resource)),
            Err(ValidationError::MissingCustomerFields(vec!["last_name", "email"]))
        );
    }

    #[test]
    fn test_schedule_checks() {
        let resource = resource();
        let mut booking = record(&resource);

        booking.schedule.adults = 0;
        booking.schedule.children = 0;
        booking.schedule.infants = 2;
        let err = validate(&booking, Some(&resource)).unwrap_err();
        assert_eq!(err, ValidationError::NoGuests);
        assert_eq!(err.step(), OperatorStep::ScheduleParty);

        booking.schedule.date = None;
        assert_eq!(validate(&booking, Some(&resource)), Err(ValidationError::MissingDate));

        // Children alone are enough
        booking.schedule.date = NaiveDate::from_ymd_opt(2026, 11, 2);
        booking.schedule.children = 1;
        assert!(validate(&booking, Some(&resource)).is_ok());
    }

    #[test]
    fn test_operator_price() {
        let resource = resource();
        let mut booking = record(&resource);
        booking.schedule.infants = 4;

        let price = price_record(&PricingEngine::operator(), dec!(100), &booking, &AddOnCatalog::default());
        assert_eq!(price.subtotal, dec!(250));
        assert_eq!(price.service_fee, dec!(7.50));
        assert_eq!(price.tax, dec!(12.50));
        assert_eq!(price.total, dec!(270.00));
        assert!(!price.overridden);

        booking.pricing.manual_total = Some(dec!(199));
        let price = price_record(&PricingEngine::operator(), dec!(100), &booking, &AddOnCatalog::default());
        assert_eq!(price.total, dec!(199));
        assert!(price.overridden);
    }

    #[test]
    fn test_oversized_party_is_rejected_before_counting() {
        let resource = resource();
        let mut booking = record(&resource);
        booking.schedule.adults = u32::MAX;
        booking.schedule.children = 1;

        let err = validate(&booking, Some(&resource)).unwrap_err();
        assert_eq!(err, ValidationError::PartyTooLarge(ScheduleBlock::MAX_PER_CATEGORY));
        assert_eq!(err.code(), "PARTY_TOO_LARGE");
        assert_eq!(err.step(), OperatorStep::ScheduleParty);

        booking.schedule.adults = 2;
        booking.schedule.infants = 500;
        assert!(matches!(validate(&booking, Some(&resource)), Err(ValidationError::PartyTooLarge(_))));
    }

    #[test]
    fn test_add_on_checks() {
        let resource = resource();
        let mut booking = record(&resource);

        booking.add_on = Some(AddOnSelection::new("balloon", at(17, 0)));
        assert_eq!(
            validate(&booking, Some(&resource)),
            Err(ValidationError::UnknownAddOn("balloon".to_string()))
        );

        booking.add_on = Some(AddOnSelection::new("sunset-cruise", at(9, 0)));
        let err = validate(&booking, Some(&resource)).unwrap_err();
        assert_eq!(err, ValidationError::AddOnTimeNotOffered("sunset-cruise".to_string()));
        assert_eq!(err.step(), OperatorStep::ScheduleParty);

        booking.add_on = Some(AddOnSelection::new("sunset-cruise", at(17, 0)));
        assert_eq!(validate(&booking, Some(&resource)), Ok(dec!(100)));
    }

    #[test]
    fn test_operator_price_with_add_on() {
        let resource = resource();
        let mut booking = record(&resource);
        booking.add_on = Some(AddOnSelection::new("sunset-cruise", at(17, 0)));

        let price = price_record(&PricingEngine::operator(), dec!(100), &booking, &AddOnCatalog::default());
        assert_eq!(price.subtotal, dec!(250));
        assert_eq!(price.add_on_fare, dec!(50));
        // Fee and tax apply to the party subtotal only
        assert_eq!(price.service_fee, dec!(7.50));
        assert_eq!(price.tax, dec!(12.50));
        assert_eq!(price.total, dec!(320.00));
    }
}
