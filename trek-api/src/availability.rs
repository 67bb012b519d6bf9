use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use trek_core::{MonthAvailability, YearMonth};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// `YYYY-MM`
    pub month: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/resources/{id}/availability", get(get_availability))
}

pub async fn get_availability(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<MonthAvailability>, AppError> {
    let month: YearMonth = query
        .month
        .parse()
        .map_err(|e: trek_core::CoreError| AppError::BadRequest(e.to_string()))?;

    let resource = state
        .catalog
        .get_resource(resource_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if resource.is_none() {
        return Err(AppError::NotFound(format!("Resource not found: {}", resource_id)));
    }

    let availability = state
        .availability
        .month_availability(resource_id, month)
        .await
        .map_err(AppError::from_availability)?;

    tracing::debug!(
        "Availability for {} {}: {} days with slots",
        resource_id,
        month,
        availability.available_slots_by_date.len()
    );
    Ok(Json(availability))
}
