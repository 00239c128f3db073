//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::services::BookingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Domain error from the booking service layer
    Booking(BookingError),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Booking(e) => booking_error_response(e),
            AppError::Internal(msg) => {
                error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", msg),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn booking_error_response(err: BookingError) -> (StatusCode, ApiError) {
    let message = err.to_string();
    match err {
        BookingError::InvalidDateFormat { .. } => (
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_DATE_FORMAT", message),
        ),
        BookingError::InvalidDateRange { .. } => (
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_DATE_RANGE", message),
        ),
        BookingError::InvalidIdentifier { .. } => (
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_IDENTIFIER", message),
        ),
        BookingError::RoomAlreadyBooked { .. } => (
            StatusCode::CONFLICT,
            ApiError::new("ROOM_ALREADY_BOOKED", message),
        ),
        BookingError::AlreadyClosed { .. } => (
            StatusCode::CONFLICT,
            ApiError::new("ALREADY_CLOSED", message),
        ),
        BookingError::NotFound { .. } => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message)),
        BookingError::NotAuthorized { .. } => {
            (StatusCode::FORBIDDEN, ApiError::new("NOT_AUTHORIZED", message))
        }
        BookingError::Storage(e) => {
            error!(error = %e, "Storage error surfaced to HTTP layer");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("STORAGE_ERROR", "Internal storage error")
                    .with_details(e.to_string()),
            )
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<crate::db::repository::RepositoryError> for AppError {
    fn from(err: crate::db::repository::RepositoryError) -> Self {
        AppError::Booking(BookingError::Storage(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingId, RoomId};

    fn status_for(err: BookingError) -> StatusCode {
        booking_error_response(err).0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(BookingError::InvalidDateFormat {
                value: "bogus".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(BookingError::RoomAlreadyBooked {
                room_id: RoomId::new(1)
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(BookingError::AlreadyClosed {
                booking_id: BookingId::new(1)
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(BookingError::NotFound { entity: "Booking" }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(BookingError::NotAuthorized {
                booking_id: BookingId::new(1)
            }),
            StatusCode::FORBIDDEN
        );
    }
}
