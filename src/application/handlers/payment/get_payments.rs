//! Payment queries.

use std::sync::Arc;

use crate::domain::booking::BookingError;
use crate::domain::foundation::{BookingId, PaymentId};
use crate::domain::payment::Payment;
use crate::ports::{BookingRepository, PaymentRepository};

/// Query for one payment attempt.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub payment_id: PaymentId,
}

pub struct GetPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl GetPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<Payment, BookingError> {
        self.payments
            .find_by_id(query.payment_id)
            .await?
            .ok_or_else(|| BookingError::PaymentNotFound(query.payment_id.to_string()))
    }
}

/// Query for every attempt made for a booking.
#[derive(Debug, Clone)]
pub struct ListBookingPaymentsQuery {
    pub booking_id: BookingId,
}

/// Returns attempts newest first.
pub struct ListBookingPaymentsHandler {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl ListBookingPaymentsHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { bookings, payments }
    }

    pub async fn handle(&self, query: ListBookingPaymentsQuery) -> Result<Vec<Payment>, BookingError> {
        if self.bookings.find_by_id(query.booking_id).await?.is_none() {
            return Err(BookingError::BookingNotFound(query.booking_id));
        }
        Ok(self.payments.list_by_booking(query.booking_id).await?)
    }
}
