//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Booking and payment storage, catalog reads
//! - `memory` - In-memory store for tests and local runs
//! - `momo` / `vnpay` - Payment gateway adapters
//! - `notification` - Confirmation e-mail delivery
//! - `http` - REST API

pub mod http;
pub mod memory;
pub mod momo;
pub mod notification;
pub mod postgres;
pub mod vnpay;

use std::sync::Arc;
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::ports::{CallbackUrls, PaymentError, PaymentGateways};

pub use memory::InMemoryStore;
pub use momo::MomoGateway;
pub use notification::{ResendNotifier, TracingNotifier};
pub use postgres::{PostgresBookingRepository, PostgresCatalogReader, PostgresPaymentRepository};
pub use vnpay::VnpayGateway;

/// Registers every gateway that has a configuration section.
///
/// # Errors
///
/// Returns `PaymentError` if an adapter's HTTP client cannot be built.
pub fn payment_gateways(config: &PaymentConfig) -> Result<PaymentGateways, PaymentError> {
    let mut gateways = PaymentGateways::new();

    if let Some(momo) = &config.momo {
        let urls = CallbackUrls {
            return_url: momo.redirect_url.clone(),
            notify_url: Some(momo.ipn_url.clone()),
        };
        let timeout = Duration::from_secs(config.request_timeout_secs);
        gateways = gateways.with(Arc::new(MomoGateway::new(momo.clone(), timeout)?), urls);
    }

    if let Some(vnpay) = &config.vnpay {
        let urls = CallbackUrls {
            return_url: vnpay.return_url.clone(),
            notify_url: vnpay.ipn_url.clone(),
        };
        gateways = gateways.with(Arc::new(VnpayGateway::new(vnpay.clone())), urls);
    }

    Ok(gateways)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::payment_fixtures;
    use crate::domain::payment::GatewayKind;

    #[test]
    fn only_configured_gateways_are_registered() {
        let config = PaymentConfig {
            vnpay: Some(payment_fixtures::vnpay()),
            ..PaymentConfig::default()
        };

        let gateways = payment_gateways(&config).unwrap();

        assert!(gateways.is_configured(GatewayKind::Vnpay));
        assert!(!gateways.is_configured(GatewayKind::Momo));
    }

    #[test]
    fn both_gateways_registered_when_configured() {
        let config = PaymentConfig {
            momo: Some(payment_fixtures::momo()),
            vnpay: Some(payment_fixtures::vnpay()),
            ..PaymentConfig::default()
        };

        let gateways = payment_gateways(&config).unwrap();

        let (_, urls) = gateways.get(GatewayKind::Momo).unwrap();
        assert!(urls.notify_url.is_some());
        assert!(gateways.is_configured(GatewayKind::Vnpay));
    }
}
