//! CreateBookingWithPaymentHandler - Creates a booking and opens its first
//! payment attempt in one flow.
//!
//! If the attempt cannot be opened after the booking was written, the booking
//! is cancelled so its seats are not held without a way to pay.

use std::sync::Arc;

use crate::domain::booking::{
    round_to_currency_unit, Booking, BookingError, BookingStatus, PriceBreakdown,
};
use crate::domain::catalog::{Seat, Showtime};
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{GatewayKind, Payment};
use crate::ports::{BookingRepository, PaymentRedirect};

use super::create_booking::{CreateBookingCommand, CreateBookingHandler};
use super::start_payment::StartPaymentHandler;

/// Command to create a booking paid through a gateway.
#[derive(Debug, Clone)]
pub struct CreateBookingWithPaymentCommand {
    pub gateway: GatewayKind,
    pub booking: CreateBookingCommand,
    pub client_ip: Option<String>,
}

/// Result of a booking created together with its payment attempt.
#[derive(Debug, Clone)]
pub struct CreateBookingWithPaymentResult {
    pub booking: Booking,
    pub showtime: Showtime,
    pub seats: Vec<Seat>,
    pub price: PriceBreakdown,
    pub payment: Payment,
    pub redirect: PaymentRedirect,
}

/// Handler composing booking creation and payment start.
pub struct CreateBookingWithPaymentHandler {
    create: Arc<CreateBookingHandler>,
    start: Arc<StartPaymentHandler>,
    bookings: Arc<dyn BookingRepository>,
    minimum_amount: i64,
}

impl CreateBookingWithPaymentHandler {
    pub fn new(
        create: Arc<CreateBookingHandler>,
        start: Arc<StartPaymentHandler>,
        bookings: Arc<dyn BookingRepository>,
        minimum_amount: i64,
    ) -> Self {
        Self {
            create,
            start,
            bookings,
            minimum_amount,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateBookingWithPaymentCommand,
    ) -> Result<CreateBookingWithPaymentResult, BookingError> {
        let CreateBookingWithPaymentCommand {
            gateway,
            mut booking,
            client_ip,
        } = cmd;

        if !self.start.supports(gateway) {
            return Err(BookingError::GatewayNotConfigured(gateway.to_string()));
        }
        booking.payment_method = Some(gateway.payment_method());

        // Price check happens before anything is written
        let prepared = self.create.prepare(booking).await?;
        let amount = round_to_currency_unit(prepared.price.total)
            .ok_or_else(|| BookingError::validation("amount", "Amount out of range"))?;
        if amount < self.minimum_amount {
            return Err(BookingError::AmountBelowMinimum {
                amount,
                minimum: self.minimum_amount,
            });
        }

        let created = self.create.persist(prepared).await?;

        match self.start.start_for(&created.booking, gateway, client_ip).await {
            Ok(started) => Ok(CreateBookingWithPaymentResult {
                booking: created.booking,
                showtime: created.showtime,
                seats: created.seats,
                price: created.price,
                payment: started.payment,
                redirect: started.redirect,
            }),
            Err(err) => {
                self.compensate(created.booking, &err).await;
                Err(err)
            }
        }
    }

    /// Cancels a booking whose payment could not be opened.
    async fn compensate(&self, mut booking: Booking, cause: &BookingError) {
        let code = booking.booking_code.clone();
        if let Err(err) = booking.cancel(Timestamp::now()) {
            tracing::error!(booking_code = %code, error = %err, "Compensating cancel refused");
            return;
        }

        match self
            .bookings
            .save_transition(&booking, BookingStatus::Pending)
            .await
        {
            Ok(true) => tracing::warn!(
                booking_code = %code,
                cause = %cause,
                "Booking cancelled after payment start failed"
            ),
            Ok(false) => tracing::warn!(
                booking_code = %code,
                "Booking left pending before compensation; skipped"
            ),
            Err(err) => tracing::error!(
                booking_code = %code,
                error = %err,
                "Compensating cancel failed; stale sweep will release seats"
            ),
        }
    }
}
