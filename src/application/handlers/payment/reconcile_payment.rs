//! ReconcilePaymentHandler - Applies a provider callback to payment and booking.
//!
//! Both entry points of every provider (server-to-server notification and
//! browser return) run through this handler, so they cannot disagree about
//! the outcome of one event.
//!
//! Order of checks:
//! 1. Signature and field parsing (adapter)
//! 2. Payment lookup by order reference
//! 3. Amount equality with the requested amount
//! 4. Atomic settlement in the store
//!
//! Any rejection leaves all state untouched.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{
    BookingTransition, CallbackParams, GatewayCallback, GatewayKind, Payment, PaymentStatus,
    Settlement,
};
use crate::ports::{PaymentErrorCode, PaymentGateways, PaymentRepository};

/// Command carrying a raw callback.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub gateway: GatewayKind,
    pub params: CallbackParams,
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentResult {
    pub callback: GatewayCallback,
    pub settlement: Settlement,
    pub payment: Payment,
    pub booking: Booking,
}

impl ReconcilePaymentResult {
    /// True when the callback changed nothing because the payment was already settled.
    pub fn is_replay(&self) -> bool {
        self.settlement.is_replay()
    }
}

pub struct ReconcilePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateways: PaymentGateways,
}

impl ReconcilePaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, gateways: PaymentGateways) -> Self {
        Self { payments, gateways }
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<ReconcilePaymentResult, BookingError> {
        let gateway = cmd.gateway;
        let (adapter, _) = self
            .gateways
            .get(gateway)
            .ok_or_else(|| BookingError::GatewayNotConfigured(gateway.to_string()))?;

        // 1. Authenticate
        let callback = adapter.parse_callback(&cmd.params).map_err(|err| {
            tracing::warn!(
                gateway = %gateway,
                error_code = %err.code,
                "Rejected payment callback"
            );
            match err.code {
                PaymentErrorCode::InvalidSignature => BookingError::invalid_signature(gateway.as_str()),
                _ => BookingError::validation("callback", err.message),
            }
        })?;

        // 2. Locate the attempt
        let payment = self
            .payments
            .find_latest_by_order(gateway, &callback.order_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(gateway = %gateway, order_id = %callback.order_id, "Callback for unknown order");
                BookingError::PaymentNotFound(callback.order_id.clone())
            })?;

        // 3. Amount must match what was requested
        if callback.amount != payment.amount {
            tracing::warn!(
                gateway = %gateway,
                payment_id = %payment.id,
                expected = payment.amount,
                received = callback.amount,
                "Callback amount mismatch"
            );
            return Err(BookingError::AmountMismatch {
                expected: payment.amount,
                received: callback.amount,
            });
        }

        // 4. Settle atomically
        let record = self
            .payments
            .apply_callback(payment.id, &callback, Timestamp::now())
            .await?;

        log_settlement(gateway, &record.payment, &record.booking, record.settlement);

        Ok(ReconcilePaymentResult {
            callback,
            settlement: record.settlement,
            payment: record.payment,
            booking: record.booking,
        })
    }
}

fn log_settlement(gateway: GatewayKind, payment: &Payment, booking: &Booking, settlement: Settlement) {
    match settlement {
        Settlement::AlreadySettled { status } => tracing::info!(
            gateway = %gateway,
            payment_id = %payment.id,
            status = status.as_str(),
            "Duplicate callback ignored"
        ),
        Settlement::Applied {
            status: PaymentStatus::Success,
            booking: BookingTransition::Unchanged,
        } => tracing::warn!(
            gateway = %gateway,
            payment_id = %payment.id,
            booking_code = %booking.booking_code,
            booking_status = booking.status.as_str(),
            "Payment succeeded for a booking that is no longer pending; refund required"
        ),
        Settlement::Applied { status, booking: transition } => tracing::info!(
            gateway = %gateway,
            payment_id = %payment.id,
            booking_code = %booking.booking_code,
            status = status.as_str(),
            booking_transition = ?transition,
            "Payment settled"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::booking::{
        CreateBookingHandler, StartPaymentCommand, StartPaymentHandler,
    };
    use crate::application::handlers::test_support::*;
    use crate::domain::booking::{BookingSeatStatus, BookingStatus, PaymentMethod, PricingPolicy};
    use crate::ports::{BookingRepository, CallbackUrls, PaymentGateway};

    fn gateways() -> PaymentGateways {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(MockGateway::new(GatewayKind::Momo));
        PaymentGateways::new().with(
            gateway,
            CallbackUrls {
                return_url: "http://localhost/return".to_string(),
                notify_url: None,
            },
        )
    }

    async fn paid_booking(store: &Arc<InMemoryStore>) -> (Booking, Payment) {
        let booking = CreateBookingHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            PricingPolicy::default(),
        )
        .handle(booking_command(STANDARD_USER, OFF_PEAK_SHOWTIME, &[3]))
        .await
        .unwrap()
        .booking;
        let payment = StartPaymentHandler::new(store.clone(), store.clone(), gateways(), 1000)
            .handle(StartPaymentCommand {
                gateway: GatewayKind::Momo,
                booking_id: booking.id,
                client_ip: None,
            })
            .await
            .unwrap()
            .payment;
        (booking, payment)
    }

    fn handler(store: &Arc<InMemoryStore>) -> ReconcilePaymentHandler {
        ReconcilePaymentHandler::new(store.clone(), gateways())
    }

    fn callback(booking: &Booking, amount: i64, succeeded: bool) -> ReconcilePaymentCommand {
        ReconcilePaymentCommand {
            gateway: GatewayKind::Momo,
            params: MockGateway::callback(booking.booking_code.as_str(), amount, succeeded),
        }
    }

    async fn stored_booking(store: &Arc<InMemoryStore>, booking: &Booking) -> Booking {
        BookingRepository::find_by_id(store.as_ref(), booking.id)
            .await
            .unwrap()
            .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Settlement
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn success_confirms_booking() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;

        let result = handler(&store)
            .handle(callback(&booking, 50000, true))
            .await
            .unwrap();

        assert_eq!(result.payment.status, PaymentStatus::Success);
        assert_eq!(result.booking.status, BookingStatus::Confirmed);
        assert_eq!(result.booking.payment_method, Some(PaymentMethod::Momo));
        assert_eq!(result.payment.transaction_id.as_deref(), Some("T-1"));
        assert_eq!(stored_booking(&store, &booking).await.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn failure_cancels_booking_and_releases_seats() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;

        let result = handler(&store)
            .handle(callback(&booking, 50000, false))
            .await
            .unwrap();

        assert_eq!(result.payment.status, PaymentStatus::Failed);
        let stored = stored_booking(&store, &booking).await;
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert!(stored.seats.iter().all(|s| s.status == BookingSeatStatus::Cancelled));
    }

    #[tokio::test]
    async fn replayed_callback_is_a_no_op() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;
        let handler = handler(&store);

        let first = handler.handle(callback(&booking, 50000, true)).await.unwrap();
        let second = handler.handle(callback(&booking, 50000, true)).await.unwrap();

        assert!(!first.is_replay());
        assert!(second.is_replay());
        assert_eq!(second.payment, first.payment);
        assert_eq!(second.booking, first.booking);
        assert_eq!(store.payment_count(), 1);
    }

    #[tokio::test]
    async fn late_success_leaves_cancelled_booking_cancelled() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;
        // Booking cancelled while its attempt is still pending
        let mut cancelled = stored_booking(&store, &booking).await;
        cancelled.cancel(Timestamp::now()).unwrap();
        BookingRepository::save_transition(store.as_ref(), &cancelled, BookingStatus::Pending)
            .await
            .unwrap();

        let result = handler(&store)
            .handle(callback(&booking, 50000, true))
            .await
            .unwrap();

        assert_eq!(result.payment.status, PaymentStatus::Success);
        assert_eq!(result.booking.status, BookingStatus::Cancelled);
        assert_eq!(
            result.settlement,
            Settlement::Applied {
                status: PaymentStatus::Success,
                booking: BookingTransition::Unchanged
            }
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_signature_mutates_nothing() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;
        let mut cmd = callback(&booking, 50000, true);
        cmd.params.insert("signature", "forged");

        let err = handler(&store).handle(cmd).await.unwrap_err();

        assert_eq!(err, BookingError::invalid_signature("momo"));
        assert_eq!(stored_booking(&store, &booking).await.status, BookingStatus::Pending);
        let payments = store.list_by_booking(booking.id).await.unwrap();
        assert_eq!(payments[0].status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn amount_mismatch_mutates_nothing() {
        let store = seeded_store();
        let (booking, _) = paid_booking(&store).await;

        let err = handler(&store)
            .handle(callback(&booking, 1000, true))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            BookingError::AmountMismatch {
                expected: 50000,
                received: 1000
            }
        );
        assert_eq!(stored_booking(&store, &booking).await.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_order_is_payment_not_found() {
        let store = seeded_store();
        let err = handler(&store)
            .handle(ReconcilePaymentCommand {
                gateway: GatewayKind::Momo,
                params: MockGateway::callback("BK-0-missing", 50000, true),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::PaymentNotFound("BK-0-missing".to_string()));
    }

    #[tokio::test]
    async fn unconfigured_gateway_is_rejected() {
        let store = seeded_store();
        let err = handler(&store)
            .handle(ReconcilePaymentCommand {
                gateway: GatewayKind::Vnpay,
                params: CallbackParams::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::GatewayNotConfigured("vnpay".to_string()));
    }
}
