//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod booking;
pub mod payment;

#[cfg(test)]
pub(crate) mod test_support;

pub use booking::*;
pub use payment::*;
