//! HTTP routes for booking endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    cancel_booking, create_booking, create_booking_with_gateway, get_booking,
    list_available_seats, list_booking_payments, list_bookings, list_user_bookings,
    update_booking,
};

/// Creates the booking router.
///
/// `POST /bookings/:id` treats the segment as a gateway name; the other
/// methods on that path treat it as a booking id.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route(
            "/bookings/:id",
            get(get_booking)
                .patch(update_booking)
                .delete(cancel_booking)
                .post(create_booking_with_gateway),
        )
        .route("/bookings/:id/payments", get(list_booking_payments))
        .route("/users/:id/bookings", get(list_user_bookings))
        .route("/showtimes/:id/available-seats", get(list_available_seats))
}
