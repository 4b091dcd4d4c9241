//! Payment repository port.
//!
//! Settlement writes the payment row and its booking (plus the booking's seat
//! rows on cancellation) in a single atomic unit. Implementations delegate the
//! transition rules to [`crate::domain::payment::settle`].

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, PaymentId, Timestamp};
use crate::domain::payment::{GatewayCallback, GatewayKind, NewPayment, Payment, Settlement};

/// Why a payment insert was refused.
#[derive(Debug, Clone)]
pub enum InsertPaymentError {
    /// The booking already has a pending payment attempt.
    PendingExists,
    Storage(DomainError),
}

impl From<DomainError> for InsertPaymentError {
    fn from(err: DomainError) -> Self {
        InsertPaymentError::Storage(err)
    }
}

/// Rows as they stand after a settlement attempt.
#[derive(Debug, Clone)]
pub struct SettlementRecord {
    pub settlement: Settlement,
    pub payment: Payment,
    pub booking: Booking,
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a pending attempt. At most one pending attempt per booking.
    async fn insert(&self, payment: &NewPayment) -> Result<Payment, InsertPaymentError>;

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Most recent attempt for a provider order reference.
    async fn find_latest_by_order(
        &self,
        provider: GatewayKind,
        order_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// All attempts for a booking, newest first.
    async fn list_by_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>, DomainError>;

    /// Apply a verified callback to a payment and its booking atomically.
    ///
    /// Safe to call repeatedly: a settled payment yields
    /// [`Settlement::AlreadySettled`] and nothing is written.
    async fn apply_callback(
        &self,
        payment_id: PaymentId,
        callback: &GatewayCallback,
        now: Timestamp,
    ) -> Result<SettlementRecord, DomainError>;
}
