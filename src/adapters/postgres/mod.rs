//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresBookingRepository` - bookings and their seat assignments
//! - `PostgresPaymentRepository` - payment attempts and atomic settlement
//! - `PostgresCatalogReader` - showtimes, seats and the user directory

mod booking_repository;
mod catalog_reader;
mod payment_repository;
mod rows;

pub use booking_repository::PostgresBookingRepository;
pub use catalog_reader::PostgresCatalogReader;
pub use payment_repository::PostgresPaymentRepository;

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Opens a connection pool sized and timed from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options =
        PgConnectOptions::from_str(&config.url)?.application_name(&config.application_name);
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout())
        .connect_with(options)
        .await
}

/// Applies the schema in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
