//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool needs max_connections >= min_connections and > 0")]
    InvalidPoolSize,

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Gateway URLs must use HTTPS in production: {0}")]
    UrlMustBeHttps(&'static str),

    #[error("Minimum payment amount must be positive")]
    InvalidMinimumAmount,

    #[error("Student discount must be a factor in (0, 1]")]
    InvalidDiscount,

    #[error("Peak surcharge cannot be negative")]
    InvalidSurcharge,

    #[error("Evening threshold must be HH:MM")]
    InvalidEveningThreshold,

    #[error("Pending booking TTL and sweep interval must be positive")]
    InvalidSweepSchedule,

    #[error("Invalid Resend API key format")]
    InvalidResendKey,

    #[error("Invalid from email address")]
    InvalidFromEmail,
}
