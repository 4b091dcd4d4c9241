//! Cinema Booking - Movie ticket booking core
//!
//! Seat inventory and pricing, a booking orchestrator, MoMo and VNPay
//! payment gateway adapters, and callback reconciliation with confirmation
//! dispatch.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
