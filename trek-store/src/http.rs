//! HTTP clients for the availability service and the booking endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use trek_catalog::ResourceId;
use trek_core::{
    AvailabilityError, AvailabilityService, BookingReference, BookingStore, BookingStoreError, MonthAvailability,
    OperatorBookingRecord, YearMonth,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error payload returned by the booking service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreatedBody {
    reference: BookingReference,
}

fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Reads month availability from a remote scheduling service
pub struct HttpAvailabilityService {
    client: Client,
    base_url: String,
}

impl HttpAvailabilityService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl AvailabilityService for HttpAvailabilityService {
    async fn month_availability(
        &self,
        resource_id: ResourceId,
        month: YearMonth,
    ) -> Result<MonthAvailability, AvailabilityError> {
        let url = join(&self.base_url, &format!("/v1/resources/{}/availability", resource_id));
        debug!("GET {} month={}", url, month);

        let response = self
            .client
            .get(&url)
            .query(&[("month", month.to_string())])
            .send()
            .await
            .map_err(|e| AvailabilityError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Availability service answered {}: {}", status, message);
            return Err(AvailabilityError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<MonthAvailability>()
            .await
            .map_err(|e| AvailabilityError::Malformed(e.to_string()))
    }
}

/// Submits operator bookings to the booking endpoint
pub struct HttpBookingStore {
    client: Client,
    base_url: String,
}

impl HttpBookingStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl BookingStore for HttpBookingStore {
    async fn create_booking(
        &self,
        record: &OperatorBookingRecord,
    ) -> Result<BookingReference, BookingStoreError> {
        let url = join(&self.base_url, "/v1/bookings");

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| BookingStoreError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: CreatedBody = response
                .json()
                .await
                .map_err(|e| BookingStoreError::Internal(format!("Unreadable booking response: {}", e)))?;
            return Ok(body.reference);
        }

        // Surface the server's own reason when it sent one
        let text = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) if !body.message.is_empty() => body.message,
            Ok(body) if !body.error.is_empty() => body.error,
            _ if !text.is_empty() => text,
            _ => format!("Booking service answered {}", status),
        };
        warn!("Booking rejected with {}: {}", status, reason);
        Err(BookingStoreError::Rejected(reason))
    }
}
