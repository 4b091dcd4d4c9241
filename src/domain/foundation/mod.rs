//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the status state machine trait and the
//! error types that form the vocabulary of the booking core.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    BookingId, MovieId, PaymentId, PromotionId, SeatId, ShowtimeId, TheaterId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
