//! HTTP adapter for booking endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use dto::{
    BookingDetailResponse, BookingListResponse, BookingResponse, CreateBookingRequest,
    CreateBookingResponse, CreateBookingWithPaymentResponse, UpdateBookingRequest,
};
pub use routes::booking_routes;
