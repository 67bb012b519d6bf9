use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trek_core::{BookingReference, OperatorBookingRecord, PricingBlock};
use trek_operator::{price_record, validate_record};
use trek_shared::models::events::BookingCreatedEvent;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingCreatedResponse {
    pub reference: BookingReference,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/bookings", post(create_booking))
}

/// Persist an operator booking. The record is re-validated and re-priced
/// here; a manual total sent by the operator stays authoritative.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(mut record): Json<OperatorBookingRecord>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), AppError> {
    let resource = match record.resource_id {
        Some(id) => state
            .catalog
            .get_resource(id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => None,
    };

    let fare = validate_record(&record, resource.as_ref(), &state.add_ons)
        .map_err(AppError::Validation)?;

    let breakdown = price_record(&state.pricing, fare, &record, &state.add_ons);
    if breakdown.total != record.pricing.breakdown.total {
        debug!(
            "Client total {} differs from server total {}, using server price",
            record.pricing.breakdown.total, breakdown.total
        );
    }
    record.pricing = PricingBlock {
        fare,
        breakdown,
        manual_total: record.pricing.manual_total,
    };

    let reference = state
        .bookings
        .create_booking(&record)
        .await
        .map_err(AppError::from_store)?;

    if let (Some(resource_id), Some(date)) = (record.resource_id, record.schedule.date) {
        let event = BookingCreatedEvent {
            reference: reference.to_string(),
            resource_id,
            date,
            guests: record.schedule.guests(),
            total: record.pricing.amount_due(),
            payment_status: record.payment.status.code().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        };
        // No subscribers is fine
        let _ = state.events_tx.send(event);
    }

    info!("Booking {} created, amount due {}", reference, record.pricing.amount_due());
    Ok((StatusCode::CREATED, Json(BookingCreatedResponse { reference })))
}
