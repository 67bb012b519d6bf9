use rust_decimal::Decimal;
use uuid::Uuid;

/// Published once an operator booking has been persisted.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingCreatedEvent {
    pub reference: String,
    pub resource_id: Uuid,
    pub date: chrono::NaiveDate,
    pub guests: u32,
    pub total: Decimal,
    pub payment_status: String,
    pub timestamp: i64,
}
