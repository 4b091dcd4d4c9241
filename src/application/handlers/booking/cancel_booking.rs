//! CancelBookingHandler - Command handler for cancelling bookings.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingStatus};
use crate::domain::foundation::{BookingId, Timestamp};
use crate::ports::BookingRepository;

/// Command to cancel a booking.
#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub booking_id: BookingId,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelBookingResult {
    pub booking: Booking,
    /// False when the booking was already cancelled.
    pub changed: bool,
}

/// Handler for cancelling bookings.
///
/// Cancelling releases every seat. Cancelling twice is a no-op; a confirmed
/// booking cannot be cancelled here.
pub struct CancelBookingHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl CancelBookingHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn handle(&self, cmd: CancelBookingCommand) -> Result<CancelBookingResult, BookingError> {
        let mut booking = self.load(cmd.booking_id).await?;
        let expected = booking.status;

        if !booking.cancel(Timestamp::now())? {
            return Ok(CancelBookingResult {
                booking,
                changed: false,
            });
        }

        if !self.bookings.save_transition(&booking, expected).await? {
            // Lost a race with a callback or the sweep; report what won
            let current = self.load(cmd.booking_id).await?;
            if current.status == BookingStatus::Cancelled {
                return Ok(CancelBookingResult {
                    booking: current,
                    changed: false,
                });
            }
            return Err(BookingError::invalid_state(current.status.as_str(), "cancel"));
        }

        tracing::info!(
            booking_id = %booking.id,
            booking_code = %booking.booking_code,
            "Booking cancelled"
        );

        Ok(CancelBookingResult {
            booking,
            changed: true,
        })
    }

    async fn load(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or(BookingError::BookingNotFound(id))
    }
}
