//! Booking confirmation delivery.

mod resend_notifier;
mod tracing_notifier;

pub use resend_notifier::{confirmation_html, confirmation_subject, ResendNotifier};
pub use tracing_notifier::TracingNotifier;
