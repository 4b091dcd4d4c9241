//! Booking domain.
//!
//! The booking aggregate, its status machines, booking codes and the pricing
//! engine.

mod aggregate;
mod code;
mod errors;
mod pricing;
mod status;

pub use aggregate::{Booking, BookingSeat, ContactInfo, NewBooking, PaymentMethod};
pub use code::BookingCode;
pub use errors::BookingError;
pub use pricing::{compute_price, round_to_currency_unit, PriceBreakdown, PricingPolicy};
pub use status::{BookingSeatStatus, BookingStatus};
