//! Payment domain.
//!
//! Payment attempts, their status machine, the provider-neutral callback
//! shape and the settlement rules applied when a provider reports back.

mod aggregate;
mod callback;
mod status;

pub use aggregate::{settle, BookingTransition, NewPayment, Payment, Settlement};
pub use callback::{CallbackParams, GatewayCallback, GatewayKind};
pub use status::PaymentStatus;
