//! Shared state for the booking API.

use std::sync::Arc;

use crate::application::handlers::{
    CancelBookingHandler, ConfirmationMailer, CreateBookingHandler,
    CreateBookingWithPaymentHandler, GetBookingHandler, GetPaymentHandler, ListAvailableSeatsHandler, ListBookingPaymentsHandler,
    ListBookingsHandler, ListUserBookingsHandler, PaymentReturnHandler, ReconcilePaymentHandler,
    StartPaymentHandler, UpdateBookingHandler,
};
use crate::domain::booking::PricingPolicy;
use crate::ports::{
    BookingNotifier, BookingRepository, CatalogReader, PaymentGateways, PaymentRepository,
    UserDirectory,
};

/// Dependencies shared by every request.
///
/// Cloned per request; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogReader>,
    pub users: Arc<dyn UserDirectory>,
    pub bookings: Arc<dyn BookingRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub notifier: Arc<dyn BookingNotifier>,
    pub gateways: PaymentGateways,
    pub pricing: PricingPolicy,
    /// Smallest amount, in whole currency units, a gateway accepts.
    pub minimum_amount: i64,
    /// Frontend page the browser-return endpoints redirect to.
    pub confirmation_url: String,
}

impl AppState {
    pub fn create_booking_handler(&self) -> CreateBookingHandler {
        CreateBookingHandler::new(
            self.catalog.clone(),
            self.users.clone(),
            self.bookings.clone(),
            self.pricing.clone(),
        )
    }

    pub fn start_payment_handler(&self) -> StartPaymentHandler {
        StartPaymentHandler::new(
            self.bookings.clone(),
            self.payments.clone(),
            self.gateways.clone(),
            self.minimum_amount,
        )
    }

    pub fn create_booking_with_payment_handler(&self) -> CreateBookingWithPaymentHandler {
        CreateBookingWithPaymentHandler::new(
            Arc::new(self.create_booking_handler()),
            Arc::new(self.start_payment_handler()),
            self.bookings.clone(),
            self.minimum_amount,
        )
    }

    pub fn get_booking_handler(&self) -> GetBookingHandler {
        GetBookingHandler::new(
            self.bookings.clone(),
            self.payments.clone(),
            self.catalog.clone(),
        )
    }

    pub fn list_bookings_handler(&self) -> ListBookingsHandler {
        ListBookingsHandler::new(self.bookings.clone())
    }

    pub fn list_user_bookings_handler(&self) -> ListUserBookingsHandler {
        ListUserBookingsHandler::new(self.bookings.clone(), self.users.clone())
    }

    pub fn update_booking_handler(&self) -> UpdateBookingHandler {
        UpdateBookingHandler::new(self.bookings.clone())
    }

    pub fn cancel_booking_handler(&self) -> CancelBookingHandler {
        CancelBookingHandler::new(self.bookings.clone())
    }

    pub fn available_seats_handler(&self) -> ListAvailableSeatsHandler {
        ListAvailableSeatsHandler::new(self.catalog.clone(), self.bookings.clone())
    }

    pub fn reconcile_handler(&self) -> ReconcilePaymentHandler {
        ReconcilePaymentHandler::new(self.payments.clone(), self.gateways.clone())
    }

    pub fn confirmation_mailer(&self) -> ConfirmationMailer {
        ConfirmationMailer::new(self.catalog.clone(), self.notifier.clone())
    }

    pub fn payment_return_handler(&self) -> PaymentReturnHandler {
        PaymentReturnHandler::new(
            Arc::new(self.reconcile_handler()),
            self.catalog.clone(),
            self.notifier.clone(),
            self.confirmation_url.clone(),
        )
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.payments.clone())
    }

    pub fn booking_payments_handler(&self) -> ListBookingPaymentsHandler {
        ListBookingPaymentsHandler::new(self.bookings.clone(), self.payments.clone())
    }
}
