//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CINEMA` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use cinema_booking::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod booking;
mod database;
mod email;
mod error;
mod payment;
mod server;

pub use booking::{BookingConfig, PricingConfig};
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::{MomoConfig, PaymentConfig, VnpayConfig};
pub use server::{Environment, LogFormat, ServerConfig};

#[cfg(test)]
pub(crate) use payment::fixtures as payment_fixtures;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Gateway credentials and payment limits
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Pending-booking lifecycle and pricing
    #[serde(default)]
    pub booking: BookingConfig,

    /// Confirmation email delivery (Resend)
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `CINEMA__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CINEMA__PAYMENT__MOMO__PARTNER_CODE=...` -> `payment.momo.partner_code = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CINEMA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(self.is_production())?;
        self.booking.validate()?;
        self.email.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "CINEMA__DATABASE__URL",
        "CINEMA__SERVER__PORT",
        "CINEMA__SERVER__ENVIRONMENT",
        "CINEMA__PAYMENT__MINIMUM_AMOUNT",
        "CINEMA__PAYMENT__VNPAY__TMN_CODE",
        "CINEMA__PAYMENT__VNPAY__HASH_SECRET",
        "CINEMA__PAYMENT__VNPAY__RETURN_URL",
        "CINEMA__BOOKING__PRICING__STUDENT_DISCOUNT",
    ];

    fn set_minimal_env() {
        env::set_var("CINEMA__DATABASE__URL", "postgresql://test@localhost/cinema");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/cinema");
        assert!(config.payment.momo.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.booking.pending_ttl_secs, 900);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CINEMA__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_nested_gateway_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CINEMA__PAYMENT__VNPAY__TMN_CODE", "CINEMA01");
        env::set_var("CINEMA__PAYMENT__VNPAY__HASH_SECRET", "secret");
        env::set_var(
            "CINEMA__PAYMENT__VNPAY__RETURN_URL",
            "http://localhost:8080/payment/vnpay/return",
        );
        env::set_var("CINEMA__PAYMENT__MINIMUM_AMOUNT", "5000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let vnpay = config.payment.vnpay.expect("vnpay section");
        assert_eq!(vnpay.tmn_code, "CINEMA01");
        assert_eq!(vnpay.version, "2.1.0");
        assert_eq!(config.payment.minimum_amount, 5000);
    }

    #[test]
    fn test_pricing_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CINEMA__BOOKING__PRICING__STUDENT_DISCOUNT", "0.5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.booking.pricing.student_discount,
            rust_decimal::Decimal::new(5, 1)
        );
    }
}
