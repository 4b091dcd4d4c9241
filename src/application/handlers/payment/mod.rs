//! Payment handlers.
//!
//! ## Commands
//! - Reconciling provider notifications
//! - Handling browser returns (reconcile, redirect)
//! - Sending the confirmation e-mail for the settlement that confirmed a booking
//!
//! ## Queries
//! - Get one payment attempt
//! - List a booking's attempts

mod confirmation;
mod get_payments;
mod payment_return;
mod reconcile_payment;

// Commands
pub use confirmation::ConfirmationMailer;
pub use payment_return::{
    PaymentReturnCommand, PaymentReturnHandler, PaymentReturnResult, ReturnStatus,
};
pub use reconcile_payment::{
    ReconcilePaymentCommand, ReconcilePaymentHandler, ReconcilePaymentResult,
};

// Queries
pub use get_payments::{
    GetPaymentHandler, GetPaymentQuery, ListBookingPaymentsHandler, ListBookingPaymentsQuery,
};
