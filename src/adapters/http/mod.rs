//! HTTP adapters - REST API implementations.
//!
//! Booking endpoints and payment endpoints live in their own modules and
//! share one [`AppState`].

pub mod booking;
pub mod error;
pub mod extract;
pub mod payment;
pub mod state;

use axum::Router;

pub use booking::booking_routes;
pub use error::{ApiError, ErrorResponse};
pub use payment::payment_routes;
pub use state::AppState;

/// Every booking and payment route, ready for `with_state`.
pub fn api_router() -> Router<AppState> {
    Router::new().merge(booking_routes()).merge(payment_routes())
}
