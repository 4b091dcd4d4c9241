//! Booking handlers.
//!
//! ## Commands
//! - Creating bookings, with or without an immediate gateway payment
//! - Opening a payment attempt for a pending booking
//! - Cancelling and administratively updating bookings
//! - Expiring stale pending bookings
//!
//! ## Queries
//! - Get one booking with its showtime, seats and payments
//! - List a user's bookings, or all bookings by page
//! - List a showtime's available seats

mod cancel_booking;
mod create_booking;
mod create_booking_with_payment;
mod expire_stale_bookings;
mod get_booking;
mod list_available_seats;
mod list_bookings;
mod start_payment;
mod update_booking;

// Commands
pub use cancel_booking::{CancelBookingCommand, CancelBookingHandler, CancelBookingResult};
pub use create_booking::{
    CreateBookingCommand, CreateBookingHandler, CreateBookingResult, PreparedBooking,
    PLACEHOLDER_IMAGE_URL,
};
pub use create_booking_with_payment::{
    CreateBookingWithPaymentCommand, CreateBookingWithPaymentHandler,
    CreateBookingWithPaymentResult,
};
pub use expire_stale_bookings::{
    ExpireStaleBookingsCommand, ExpireStaleBookingsHandler, ExpireStaleBookingsResult,
};
pub use start_payment::{
    payable_amount, StartPaymentCommand, StartPaymentHandler, StartPaymentResult,
};
pub use update_booking::{
    BookingPatch, UpdateBookingCommand, UpdateBookingHandler, UpdateBookingResult,
};

// Queries
pub use get_booking::{BookingView, GetBookingHandler, GetBookingQuery, GetBookingResult};
pub use list_available_seats::{
    ListAvailableSeatsHandler, ListAvailableSeatsQuery, ListAvailableSeatsResult,
};
pub use list_bookings::{
    ListBookingsHandler, ListBookingsQuery, ListBookingsResult, ListUserBookingsHandler,
    ListUserBookingsQuery, ListUserBookingsResult,
};
