//! Booking confirmation notifier port.
//!
//! Delivery is best-effort: failures are logged by the caller and never affect
//! booking or payment state.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Template data for a confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_code: String,
    pub customer_name: Option<String>,
    pub showtime_date: String,
    pub showtime_time: String,
    /// Seat labels such as `"C7"`.
    pub seats: Vec<String>,
    pub total_price: Decimal,
    pub payment_method: Option<String>,
}

#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn BookingNotifier) {}
    }
}
