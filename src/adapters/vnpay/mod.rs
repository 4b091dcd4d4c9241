//! VNPay hosted-page payment adapter (gateway B).

mod secure_hash;
mod vnpay_gateway;

pub use vnpay_gateway::{describe_response_code, VnpayGateway};
