//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `CatalogReader` / `UserDirectory` - showtimes, seats and users owned elsewhere
//! - `BookingNotifier` - confirmation delivery
//!
//! ## Storage Ports
//!
//! - `BookingRepository` - booking aggregate with storage-level seat uniqueness
//! - `PaymentRepository` - payment attempts and atomic settlement
//!
//! ## Gateway Ports
//!
//! - `PaymentGateway` - one implementation per payment provider

mod booking_notifier;
mod booking_repository;
mod catalog_reader;
mod payment_gateway;
mod payment_repository;

pub use booking_notifier::{BookingConfirmation, BookingNotifier};
pub use booking_repository::{
    BookingPage, BookingRepository, GuardedWrite, InsertBookingError, PageRequest,
};
pub use catalog_reader::{CatalogReader, UserDirectory};
pub use payment_gateway::{
    CallbackUrls, PaymentError, PaymentErrorCode, PaymentGateway, PaymentGateways,
    PaymentRedirect, PaymentRequest,
};
pub use payment_repository::{InsertPaymentError, PaymentRepository, SettlementRecord};
