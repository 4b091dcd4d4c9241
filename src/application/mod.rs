//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Booking commands
    CancelBookingCommand, CancelBookingHandler, CreateBookingCommand, CreateBookingHandler,
    CreateBookingWithPaymentCommand, CreateBookingWithPaymentHandler, ExpireStaleBookingsCommand,
    ExpireStaleBookingsHandler, StartPaymentCommand, StartPaymentHandler, UpdateBookingCommand,
    UpdateBookingHandler,
    // Booking queries
    GetBookingHandler, GetBookingQuery, ListAvailableSeatsHandler, ListAvailableSeatsQuery,
    ListBookingsHandler, ListBookingsQuery, ListUserBookingsHandler, ListUserBookingsQuery,
    // Payment
    GetPaymentHandler, ListBookingPaymentsHandler, PaymentReturnHandler,
    ReconcilePaymentHandler,
};
