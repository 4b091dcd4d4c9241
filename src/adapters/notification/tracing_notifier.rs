//! Notifier that only logs. Used when no e-mail provider is configured.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{BookingConfirmation, BookingNotifier};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl BookingNotifier for TracingNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), DomainError> {
        tracing::info!(
            recipient = %recipient,
            booking_code = %confirmation.booking_code,
            seats = %confirmation.seats.join(","),
            "Booking confirmation (e-mail delivery disabled)"
        );
        Ok(())
    }
}
