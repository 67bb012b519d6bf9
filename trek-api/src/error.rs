use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use trek_core::{AvailabilityError, BookingStoreError};
use trek_operator::ValidationError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Validation(ValidationError),
    NotFound(String),
    /// Booking refused by the store; the reason is passed through as-is
    Rejected(String),
    Unavailable(String),
    Upstream(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn from_availability(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Unreachable(msg) => AppError::Unavailable(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }

    pub fn from_store(err: BookingStoreError) -> Self {
        match err {
            BookingStoreError::Rejected(reason) => AppError::Rejected(reason),
            BookingStoreError::Unreachable(msg) => AppError::Unavailable(msg),
            BookingStoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Validation(err) => {
                let body = Json(json!({
                    "error": err.code(),
                    "message": err.to_string(),
                    "step": err.step(),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Rejected(reason) => (StatusCode::CONFLICT, "BOOKING_REJECTED", reason),
            AppError::Unavailable(msg) => {
                tracing::warn!("Dependency unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg)
            }
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
