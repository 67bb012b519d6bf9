use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use trek_shared::models::events::BookingCreatedEvent;

/// Log every created booking until the channel closes. Returns the number of
/// events seen.
pub async fn start_booking_event_logger(
    mut events: broadcast::Receiver<BookingCreatedEvent>,
) -> u64 {
    info!("Booking event logger started");
    let mut seen = 0;

    loop {
        match events.recv().await {
            Ok(event) => {
                seen += 1;
                info!(
                    "Booking {} for resource {} on {}: {} guests, {} due, payment {}",
                    event.reference,
                    event.resource_id,
                    event.date,
                    event.guests,
                    event.total,
                    event.payment_status
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Booking event logger lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Booking event channel closed after {} events", seen);
                return seen;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn event(reference: &str) -> BookingCreatedEvent {
        BookingCreatedEvent {
            reference: reference.to_string(),
            resource_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            guests: 3,
            total: dec!(270.00),
            payment_status: "PENDING".to_string(),
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn test_logger_drains_until_closed() {
        let (tx, rx) = broadcast::channel(8);
        let logger = tokio::spawn(start_booking_event_logger(rx));

        tx.send(event("TRK-AAAA1111")).unwrap();
        tx.send(event("TRK-BBBB2222")).unwrap();
        drop(tx);

        assert_eq!(logger.await.unwrap(), 2);
    }
}
