//! Error responses for the booking API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::booking::BookingError;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Wraps [`BookingError`] for axum handlers.
#[derive(Debug)]
pub struct ApiError(pub BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(BookingError::from(err))
    }
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ShowtimeNotFound
        | ErrorCode::UserNotFound
        | ErrorCode::BookingNotFound
        | ErrorCode::PaymentNotFound => StatusCode::NOT_FOUND,
        ErrorCode::SeatAlreadyBooked
        | ErrorCode::DuplicateBookingCode
        | ErrorCode::PendingPaymentExists
        | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::ValidationFailed | ErrorCode::InvalidSeats | ErrorCode::AmountBelowMinimum => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::GatewayError | ErrorCode::InvalidSignature => StatusCode::BAD_GATEWAY,
        ErrorCode::GatewayNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = status_for(code);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code = %code, "Request failed");
        }

        // Storage failures carry driver text; keep it out of responses.
        let message = match &self.0 {
            BookingError::Infrastructure(_) => "Internal server error".to_string(),
            other => other.message(),
        };

        let mut body = ErrorResponse::new(code.to_string(), message);
        if let Some(ids) = self.0.seat_ids() {
            let ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
            body = body.with_details(json!({ "seatIds": ids }));
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BookingId, SeatId};

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError(BookingError::BookingNotFound(BookingId::from_raw(1))).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn seat_conflict_maps_to_409() {
        let response =
            ApiError(BookingError::SeatsAlreadyBooked(vec![SeatId::from_raw(2)])).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_and_gateway_statuses() {
        assert_eq!(status_for(ErrorCode::AmountBelowMinimum), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::InvalidSeats), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::GatewayError), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(ErrorCode::GatewayNotConfigured),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ErrorCode::DatabaseError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
