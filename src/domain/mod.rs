//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors, state machine trait)
//! - `catalog` - Read models for showtimes, seats and riders
//! - `booking` - Booking aggregate, booking codes and the pricing engine
//! - `payment` - Payment attempts and settlement rules

pub mod booking;
pub mod catalog;
pub mod foundation;
pub mod payment;
