//! HTTP adapter for payment endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use dto::{MomoAck, PaymentResponse, StartPaymentRequest, StartPaymentResponse, VnpayAck};
pub use routes::payment_routes;
