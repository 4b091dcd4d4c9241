//! ConfirmationMailer - Booking confirmation e-mail.
//!
//! The e-mail belongs to the settlement that confirmed the booking, whichever
//! entry point (provider notification or browser return) applied it. Replays
//! and settlements that leave the booking unchanged send nothing, so a
//! booking gets at most one confirmation.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::booking::{round_to_currency_unit, Booking, BookingError};
use crate::domain::catalog::{Seat, Showtime};
use crate::domain::payment::{BookingTransition, Settlement};
use crate::ports::{BookingConfirmation, BookingNotifier, CatalogReader};

use super::reconcile_payment::ReconcilePaymentResult;

pub struct ConfirmationMailer {
    catalog: Arc<dyn CatalogReader>,
    notifier: Arc<dyn BookingNotifier>,
}

impl ConfirmationMailer {
    pub fn new(catalog: Arc<dyn CatalogReader>, notifier: Arc<dyn BookingNotifier>) -> Self {
        Self { catalog, notifier }
    }

    /// Sends the confirmation when `result` is the settlement that confirmed
    /// the booking. The e-mail goes out in the background.
    pub async fn on_reconciled(&self, result: &ReconcilePaymentResult) -> Option<JoinHandle<()>> {
        if !confirmed_by(&result.settlement) {
            return None;
        }
        let details = self.details(&result.booking).await;
        self.dispatch(&result.booking, &details)
    }

    /// Display fields for a booking. Catalog errors are logged and leave the
    /// showtime fields blank.
    pub(super) async fn details(&self, booking: &Booking) -> ConfirmationDetails {
        match self.load_context(booking).await {
            Ok((showtime, seats)) => ConfirmationDetails::new(showtime.as_ref(), &seats),
            Err(err) => {
                tracing::error!(
                    booking_code = %booking.booking_code,
                    error = %err,
                    "Failed to load showtime for confirmation"
                );
                ConfirmationDetails::new(None, &[])
            }
        }
    }

    pub(super) fn dispatch(
        &self,
        booking: &Booking,
        details: &ConfirmationDetails,
    ) -> Option<JoinHandle<()>> {
        let Some(recipient) = booking.contact.email.clone() else {
            tracing::info!(booking_code = %booking.booking_code, "No e-mail on booking; confirmation skipped");
            return None;
        };

        let confirmation = BookingConfirmation {
            booking_code: booking.booking_code.to_string(),
            customer_name: booking.contact.full_name(),
            showtime_date: details.showtime_date.clone(),
            showtime_time: details.showtime_time.clone(),
            seats: details.seats.clone(),
            total_price: booking.total_price,
            payment_method: booking.payment_method.map(|m| m.as_str().to_string()),
        };
        let notifier = self.notifier.clone();

        Some(tokio::spawn(async move {
            if let Err(err) = notifier
                .send_booking_confirmation(&recipient, &confirmation)
                .await
            {
                tracing::warn!(
                    booking_code = %confirmation.booking_code,
                    error = %err,
                    "Confirmation e-mail failed"
                );
            }
        }))
    }

    async fn load_context(
        &self,
        booking: &Booking,
    ) -> Result<(Option<Showtime>, Vec<Seat>), BookingError> {
        let Some(showtime) = self.catalog.find_showtime(booking.showtime_id).await? else {
            return Ok((None, Vec::new()));
        };
        let ids = booking.seat_ids();
        let mut seats = self.catalog.find_seats(showtime.theater_id, &ids).await?;
        seats.sort_by_key(|seat| ids.iter().position(|id| *id == seat.id));
        Ok((Some(showtime), seats))
    }
}

pub(super) fn confirmed_by(settlement: &Settlement) -> bool {
    matches!(
        settlement,
        Settlement::Applied {
            booking: BookingTransition::Confirmed,
            ..
        }
    )
}

/// Display fields shared by the redirect and the e-mail.
pub(super) struct ConfirmationDetails {
    showtime_date: String,
    showtime_time: String,
    seats: Vec<String>,
}

impl ConfirmationDetails {
    fn new(showtime: Option<&Showtime>, seats: &[Seat]) -> Self {
        Self {
            showtime_date: showtime
                .map(|s| s.date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            showtime_time: showtime.map(|s| s.time.clone()).unwrap_or_default(),
            seats: seats.iter().map(Seat::label).collect(),
        }
    }

    pub fn query(&self, booking: &Booking) -> Vec<(&'static str, String)> {
        let amount = round_to_currency_unit(booking.total_price)
            .map(|a| a.to_string())
            .unwrap_or_else(|| booking.total_price.to_string());
        vec![
            ("bookingCode", booking.booking_code.to_string()),
            ("bookingId", booking.id.to_string()),
            ("amount", amount),
            ("showtimeDate", self.showtime_date.clone()),
            ("showtimeTime", self.showtime_time.clone()),
            ("seats", self.seats.join(",")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::application::handlers::booking::{
        CreateBookingHandler, StartPaymentCommand, StartPaymentHandler,
    };
    use crate::application::handlers::payment::{ReconcilePaymentCommand, ReconcilePaymentHandler};
    use crate::application::handlers::test_support::*;
    use crate::domain::booking::PricingPolicy;
    use crate::domain::payment::{GatewayKind, PaymentStatus};
    use crate::ports::{CallbackUrls, PaymentGateway, PaymentGateways};

    fn gateways() -> PaymentGateways {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(MockGateway::new(GatewayKind::Momo));
        PaymentGateways::new().with(
            gateway,
            CallbackUrls {
                return_url: "http://localhost/return".to_string(),
                notify_url: Some("http://localhost/notify".to_string()),
            },
        )
    }

    async fn paid_booking(store: &Arc<InMemoryStore>) -> Booking {
        let booking = CreateBookingHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            PricingPolicy::default(),
        )
        .handle(booking_command(STANDARD_USER, OFF_PEAK_SHOWTIME, &[3, 4]))
        .await
        .unwrap()
        .booking;
        StartPaymentHandler::new(store.clone(), store.clone(), gateways(), 1000)
            .handle(StartPaymentCommand {
                gateway: GatewayKind::Momo,
                booking_id: booking.id,
                client_ip: None,
            })
            .await
            .unwrap();
        booking
    }

    async fn reconcile(
        store: &Arc<InMemoryStore>,
        booking: &Booking,
        succeeded: bool,
    ) -> ReconcilePaymentResult {
        ReconcilePaymentHandler::new(store.clone(), gateways())
            .handle(ReconcilePaymentCommand {
                gateway: GatewayKind::Momo,
                params: MockGateway::callback(booking.booking_code.as_str(), 100000, succeeded),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn confirming_settlement_sends_once() {
        let store = seeded_store();
        let booking = paid_booking(&store).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let mailer = ConfirmationMailer::new(store.clone(), notifier.clone());

        let first = reconcile(&store, &booking, true).await;
        mailer.on_reconciled(&first).await.unwrap().await.unwrap();

        let replay = reconcile(&store, &booking, true).await;
        assert!(replay.is_replay());
        assert!(mailer.on_reconciled(&replay).await.is_none());

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.seats, vec!["B1".to_string(), "B2".to_string()]);
        assert_eq!(sent[0].1.showtime_time, "14:00");
    }

    #[tokio::test]
    async fn failed_settlement_sends_nothing() {
        let store = seeded_store();
        let booking = paid_booking(&store).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let mailer = ConfirmationMailer::new(store.clone(), notifier.clone());

        let result = reconcile(&store, &booking, false).await;
        assert_eq!(result.payment.status, PaymentStatus::Failed);

        assert!(mailer.on_reconciled(&result).await.is_none());
        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn only_the_confirming_transition_counts() {
        use crate::domain::payment::PaymentStatus::*;

        assert!(confirmed_by(&Settlement::Applied {
            status: Success,
            booking: BookingTransition::Confirmed,
        }));
        assert!(!confirmed_by(&Settlement::Applied {
            status: Success,
            booking: BookingTransition::Unchanged,
        }));
        assert!(!confirmed_by(&Settlement::AlreadySettled { status: Success }));
    }
}
