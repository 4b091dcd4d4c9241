//! StartPaymentHandler - Opens a payment attempt for a pending booking.

use std::sync::Arc;

use crate::domain::booking::{round_to_currency_unit, Booking, BookingError};
use crate::domain::foundation::{BookingId, Timestamp};
use crate::domain::payment::{GatewayKind, NewPayment, Payment};
use crate::ports::{
    BookingRepository, InsertPaymentError, PaymentGateways, PaymentRedirect, PaymentRepository,
    PaymentRequest,
};

/// Loopback address sent when the caller's address is unknown.
pub const UNKNOWN_CLIENT_IP: &str = "127.0.0.1";

/// Command to start paying for a booking.
#[derive(Debug, Clone)]
pub struct StartPaymentCommand {
    pub gateway: GatewayKind,
    pub booking_id: BookingId,
    pub client_ip: Option<String>,
}

/// Result of a started payment attempt.
#[derive(Debug, Clone)]
pub struct StartPaymentResult {
    pub payment: Payment,
    pub redirect: PaymentRedirect,
}

/// Handler for opening payment attempts.
///
/// A booking has at most one pending attempt. A new attempt can be opened
/// after the previous one failed, as long as the booking itself is still
/// pending.
pub struct StartPaymentHandler {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateways: PaymentGateways,
    minimum_amount: i64,
}

impl StartPaymentHandler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateways: PaymentGateways,
        minimum_amount: i64,
    ) -> Self {
        Self {
            bookings,
            payments,
            gateways,
            minimum_amount,
        }
    }

    pub fn supports(&self, gateway: GatewayKind) -> bool {
        self.gateways.is_configured(gateway)
    }

    pub async fn handle(&self, cmd: StartPaymentCommand) -> Result<StartPaymentResult, BookingError> {
        if !self.supports(cmd.gateway) {
            return Err(BookingError::GatewayNotConfigured(cmd.gateway.to_string()));
        }

        let booking = self
            .bookings
            .find_by_id(cmd.booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(cmd.booking_id))?;

        self.start_for(&booking, cmd.gateway, cmd.client_ip).await
    }

    /// Opens an attempt for an already loaded booking.
    pub async fn start_for(
        &self,
        booking: &Booking,
        gateway: GatewayKind,
        client_ip: Option<String>,
    ) -> Result<StartPaymentResult, BookingError> {
        let (adapter, callback_urls) = self
            .gateways
            .get(gateway)
            .ok_or_else(|| BookingError::GatewayNotConfigured(gateway.to_string()))?;

        if !booking.is_pending() {
            return Err(BookingError::invalid_state(
                booking.status.as_str(),
                "start payment for",
            ));
        }

        let amount = payable_amount(booking, self.minimum_amount)?;

        let existing = self.payments.list_by_booking(booking.id).await?;
        if existing.iter().any(Payment::is_pending) {
            return Err(BookingError::PendingPaymentExists(booking.id));
        }

        let request = PaymentRequest {
            order_id: booking.booking_code.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
            amount,
            description: format!("Payment for booking {}", booking.booking_code),
            callback_urls: callback_urls.clone(),
            extra_data: booking.id.to_string(),
            client_ip: client_ip.unwrap_or_else(|| UNKNOWN_CLIENT_IP.to_string()),
        };

        let redirect = adapter
            .create_payment_request(&request)
            .await
            .map_err(|err| {
                tracing::error!(
                    gateway = %gateway,
                    booking_code = %booking.booking_code,
                    error_code = %err.code,
                    provider_code = ?err.provider_code,
                    "Payment request failed"
                );
                BookingError::gateway(gateway.as_str(), err.message)
            })?;

        let new_payment = NewPayment {
            booking_id: booking.id,
            order_id: request.order_id,
            request_id: redirect
                .provider_request_id
                .clone()
                .or(Some(request.request_id)),
            amount,
            provider: gateway,
            created_at: Timestamp::now(),
        };

        let payment = match self.payments.insert(&new_payment).await {
            Ok(payment) => payment,
            Err(InsertPaymentError::PendingExists) => {
                return Err(BookingError::PendingPaymentExists(booking.id))
            }
            Err(InsertPaymentError::Storage(err)) => return Err(err.into()),
        };

        tracing::info!(
            gateway = %gateway,
            booking_code = %booking.booking_code,
            payment_id = %payment.id,
            amount,
            "Payment attempt opened"
        );

        Ok(StartPaymentResult { payment, redirect })
    }
}

/// Rounds the booking total for a gateway and checks the provider minimum.
pub fn payable_amount(booking: &Booking, minimum: i64) -> Result<i64, BookingError> {
    let amount = round_to_currency_unit(booking.total_price)
        .ok_or_else(|| BookingError::validation("amount", "Amount out of range"))?;
    if amount < minimum {
        return Err(BookingError::AmountBelowMinimum { amount, minimum });
    }
    Ok(amount)
}
