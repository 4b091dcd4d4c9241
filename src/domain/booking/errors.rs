//! Booking-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ShowtimeNotFound / UserNotFound / BookingNotFound / PaymentNotFound | 404 |
//! | SeatsAlreadyBooked / DuplicateBookingCode / PendingPaymentExists / InvalidState | 409 |
//! | InvalidSeats / ValidationFailed / AmountBelowMinimum / AmountMismatch | 400 |
//! | Gateway / InvalidSignature | 502 / 400 |
//! | GatewayNotConfigured | 503 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, SeatId, ShowtimeId, UserId, ValidationError,
};

/// Booking and payment errors surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    ShowtimeNotFound(ShowtimeId),

    UserNotFound(UserId),

    BookingNotFound(BookingId),

    /// No payment matches the provider's order reference.
    PaymentNotFound(String),

    /// Requested seats that do not belong to the showtime's theater.
    InvalidSeats(Vec<SeatId>),

    /// Seats already held by another booking for the same showtime.
    SeatsAlreadyBooked(Vec<SeatId>),

    /// Booking code collided repeatedly.
    DuplicateBookingCode(String),

    /// The booking already has an unsettled payment attempt.
    PendingPaymentExists(BookingId),

    InvalidState {
        current: String,
        attempted: String,
    },

    ValidationFailed {
        field: String,
        message: String,
    },

    AmountBelowMinimum {
        amount: i64,
        minimum: i64,
    },

    /// A verified callback reported a different amount than was requested.
    AmountMismatch {
        expected: i64,
        received: i64,
    },

    /// Provider API or network failure.
    Gateway {
        gateway: String,
        message: String,
    },

    GatewayNotConfigured(String),

    /// Callback failed authenticity checks.
    InvalidSignature {
        gateway: String,
    },

    Infrastructure(String),
}

impl BookingError {
    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BookingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn gateway(gateway: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Gateway {
            gateway: gateway.into(),
            message: message.into(),
        }
    }

    pub fn invalid_signature(gateway: impl Into<String>) -> Self {
        BookingError::InvalidSignature {
            gateway: gateway.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BookingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::ShowtimeNotFound(_) => ErrorCode::ShowtimeNotFound,
            BookingError::UserNotFound(_) => ErrorCode::UserNotFound,
            BookingError::BookingNotFound(_) => ErrorCode::BookingNotFound,
            BookingError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            BookingError::InvalidSeats(_) => ErrorCode::InvalidSeats,
            BookingError::SeatsAlreadyBooked(_) => ErrorCode::SeatAlreadyBooked,
            BookingError::DuplicateBookingCode(_) => ErrorCode::DuplicateBookingCode,
            BookingError::PendingPaymentExists(_) => ErrorCode::PendingPaymentExists,
            BookingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BookingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BookingError::AmountBelowMinimum { .. } => ErrorCode::AmountBelowMinimum,
            BookingError::AmountMismatch { .. } => ErrorCode::ValidationFailed,
            BookingError::Gateway { .. } => ErrorCode::GatewayError,
            BookingError::GatewayNotConfigured(_) => ErrorCode::GatewayNotConfigured,
            BookingError::InvalidSignature { .. } => ErrorCode::InvalidSignature,
            BookingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BookingError::ShowtimeNotFound(id) => format!("Showtime {} not found", id),
            BookingError::UserNotFound(id) => format!("User {} not found", id),
            BookingError::BookingNotFound(id) => format!("Booking {} not found", id),
            BookingError::PaymentNotFound(order_id) => {
                format!("No payment found for order {}", order_id)
            }
            BookingError::InvalidSeats(ids) => {
                format!("Invalid or unavailable seat IDs: {}", join_ids(ids))
            }
            BookingError::SeatsAlreadyBooked(ids) => {
                format!("Seats already booked: {}", join_ids(ids))
            }
            BookingError::DuplicateBookingCode(code) => {
                format!("Booking code {} is already in use", code)
            }
            BookingError::PendingPaymentExists(id) => {
                format!("Booking {} already has a pending payment", id)
            }
            BookingError::InvalidState { current, attempted } => {
                format!("Cannot {} a booking in {} state", attempted, current)
            }
            BookingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BookingError::AmountBelowMinimum { amount, minimum } => {
                format!("Amount {} is below the provider minimum of {}", amount, minimum)
            }
            BookingError::AmountMismatch { expected, received } => {
                format!("Callback amount {} does not match requested {}", received, expected)
            }
            BookingError::Gateway { gateway, message } => {
                format!("Payment gateway {} failed: {}", gateway, message)
            }
            BookingError::GatewayNotConfigured(gateway) => {
                format!("Payment gateway {} is not configured", gateway)
            }
            BookingError::InvalidSignature { gateway } => {
                format!("Invalid {} callback signature", gateway)
            }
            BookingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Seat ids carried by seat-related errors.
    pub fn seat_ids(&self) -> Option<&[SeatId]> {
        match self {
            BookingError::InvalidSeats(ids) | BookingError::SeatsAlreadyBooked(ids) => Some(ids),
            _ => None,
        }
    }
}

fn join_ids(ids: &[SeatId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BookingError {}

impl From<DomainError> for BookingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => BookingError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            _ => BookingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BookingError> for DomainError {
    fn from(err: BookingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
