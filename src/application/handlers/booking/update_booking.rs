//! UpdateBookingHandler - Administrative booking updates.
//!
//! Detail fields (contact, payment method, image) are written as-is. A status
//! change goes through the booking state machine, so cancelling here releases
//! seats exactly like the cancel operation. Price and seats never change.
//!
//! Details and status are stored in one write guarded by the status that was
//! read, so an edit that loses a race leaves nothing behind.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError, BookingStatus, PaymentMethod};
use crate::domain::foundation::{BookingId, Timestamp};
use crate::ports::{BookingRepository, GuardedWrite};

/// Fields an administrator may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub image_url: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl BookingPatch {
    fn has_details(&self) -> bool {
        self.payment_method.is_some()
            || self.image_url.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.phone_number.is_some()
    }
}

/// Command to update a booking.
#[derive(Debug, Clone)]
pub struct UpdateBookingCommand {
    pub booking_id: BookingId,
    pub patch: BookingPatch,
}

/// Result of an update.
#[derive(Debug, Clone)]
pub struct UpdateBookingResult {
    pub booking: Booking,
}

/// Handler for administrative booking updates.
pub struct UpdateBookingHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl UpdateBookingHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn handle(&self, cmd: UpdateBookingCommand) -> Result<UpdateBookingResult, BookingError> {
        let UpdateBookingCommand { booking_id, patch } = cmd;
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        let now = Timestamp::now();
        let expected = booking.status;

        // Validate on the aggregate before any write
        if patch.has_details() {
            apply_details(&mut booking, &patch, now);
        }
        let target = patch.status.filter(|target| *target != expected);
        if let Some(target) = target {
            apply_transition(&mut booking, target, now)?;
        }

        if patch.has_details() || target.is_some() {
            let outcome = self.bookings.save_update(&booking, expected).await?;
            if let GuardedWrite::StatusChanged(current) = outcome {
                return Err(BookingError::invalid_state(current.as_str(), "update"));
            }
        }

        tracing::info!(booking_id = %booking.id, status = booking.status.as_str(), "Booking updated");
        Ok(UpdateBookingResult { booking })
    }
}

fn apply_transition(
    booking: &mut Booking,
    target: BookingStatus,
    now: Timestamp,
) -> Result<(), BookingError> {
    match target {
        BookingStatus::Cancelled => {
            booking.cancel(now)?;
        }
        BookingStatus::Confirmed => {
            let method = booking.payment_method.ok_or_else(|| {
                BookingError::validation("paymentMethod", "Required to confirm a booking")
            })?;
            booking.confirm(method, now)?;
        }
        BookingStatus::Pending => {
            return Err(BookingError::invalid_state(booking.status.as_str(), "reopen"));
        }
    }
    Ok(())
}

fn apply_details(booking: &mut Booking, patch: &BookingPatch, now: Timestamp) {
    if let Some(method) = patch.payment_method {
        booking.payment_method = Some(method);
    }
    if let Some(url) = &patch.image_url {
        booking.image_url = Some(url.clone());
    }
    let contact = &mut booking.contact;
    if let Some(v) = &patch.first_name {
        contact.first_name = Some(v.clone());
    }
    if let Some(v) = &patch.last_name {
        contact.last_name = Some(v.clone());
    }
    if let Some(v) = &patch.email {
        contact.email = Some(v.clone());
    }
    if let Some(v) = &patch.phone_number {
        contact.phone_number = Some(v.clone());
    }
    booking.updated_at = now;
}
