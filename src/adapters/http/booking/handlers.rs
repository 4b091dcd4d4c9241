//! HTTP handlers for booking endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::{parse_gateway, ClientIp};
use crate::adapters::http::payment::dto::PaymentResponse;
use crate::adapters::http::state::AppState;
use crate::application::handlers::{
    CancelBookingCommand, CreateBookingWithPaymentCommand, GetBookingQuery,
    ListAvailableSeatsQuery, ListBookingPaymentsQuery, ListBookingsQuery, ListUserBookingsQuery,
    UpdateBookingCommand,
};
use crate::domain::booking::BookingError;
use crate::domain::foundation::{BookingId, ShowtimeId, UserId};
use crate::ports::PageRequest;

use super::dto::{
    AvailableSeatsResponse, BookingDetailResponse, BookingListResponse, BookingResponse,
    CancelBookingResponse, CreateBookingRequest, CreateBookingResponse,
    CreateBookingWithPaymentResponse, ListBookingsParams, PriceResponse, RedirectResponse,
    SeatResponse, ShowtimeResponse, UpdateBookingRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Commands
// ════════════════════════════════════════════════════════════════════════════════

/// POST /bookings - Create a pending booking
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = request.into_command()?;
    let result = state.create_booking_handler().handle(command).await?;

    let response = CreateBookingResponse {
        booking: BookingResponse::from(&result.booking),
        showtime: ShowtimeResponse::from(&result.showtime),
        seats: result.seats.iter().map(SeatResponse::from).collect(),
        price: PriceResponse::from(result.price),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /bookings/{gateway} - Create a booking and open a gateway payment
pub async fn create_booking_with_gateway(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    ClientIp(client_ip): ClientIp,
    Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gateway = parse_gateway(&gateway)?;
    let command = CreateBookingWithPaymentCommand {
        gateway,
        booking: request.into_command()?,
        client_ip,
    };
    let result = state
        .create_booking_with_payment_handler()
        .handle(command)
        .await?;

    let response = CreateBookingWithPaymentResponse {
        booking: BookingResponse::from(&result.booking),
        showtime: ShowtimeResponse::from(&result.showtime),
        seats: result.seats.iter().map(SeatResponse::from).collect(),
        price: PriceResponse::from(result.price),
        payment: PaymentResponse::from(&result.payment),
        redirect: RedirectResponse::from(&result.redirect),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /bookings/{id} - Administrative update
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateBookingCommand {
        booking_id: BookingId::new(id).map_err(BookingError::from)?,
        patch: request.into(),
    };
    let result = state.update_booking_handler().handle(command).await?;
    Ok(Json(BookingResponse::from(&result.booking)))
}

/// DELETE /bookings/{id} - Cancel a booking and release its seats
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CancelBookingCommand {
        booking_id: booking_id(id)?,
    };
    let result = state.cancel_booking_handler().handle(command).await?;
    Ok(Json(CancelBookingResponse {
        booking: BookingResponse::from(&result.booking),
        changed: result.changed,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

/// GET /bookings?page=&limit= - Paginated listing, newest first
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<ListBookingsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let defaults = PageRequest::default();
    let query = ListBookingsQuery {
        page: PageRequest::new(
            params.page.unwrap_or(defaults.page),
            params.limit.unwrap_or(defaults.limit),
        ),
    };
    let page = state.list_bookings_handler().handle(query).await?;
    Ok(Json(BookingListResponse::from(page)))
}

/// GET /bookings/{id} - Booking with showtime, seats and payments
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetBookingQuery {
        booking_id: booking_id(id)?,
    };
    let view = state.get_booking_handler().handle(query).await?;
    Ok(Json(BookingDetailResponse::from(view)))
}

/// GET /bookings/{id}/payments - Payment attempts, newest first
pub async fn list_booking_payments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListBookingPaymentsQuery {
        booking_id: booking_id(id)?,
    };
    let payments = state.booking_payments_handler().handle(query).await?;
    let response: Vec<PaymentResponse> = payments.iter().map(PaymentResponse::from).collect();
    Ok(Json(response))
}

/// GET /users/{id}/bookings - A user's bookings, newest first
pub async fn list_user_bookings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListUserBookingsQuery {
        user_id: UserId::new(id).map_err(BookingError::from)?,
    };
    let bookings = state.list_user_bookings_handler().handle(query).await?;
    let response: Vec<BookingResponse> = bookings.iter().map(BookingResponse::from).collect();
    Ok(Json(response))
}

/// GET /showtimes/{id}/available-seats
pub async fn list_available_seats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ListAvailableSeatsQuery {
        showtime_id: ShowtimeId::new(id).map_err(BookingError::from)?,
    };
    let result = state.available_seats_handler().handle(query).await?;
    Ok(Json(AvailableSeatsResponse {
        showtime: ShowtimeResponse::from(&result.showtime),
        seats: result.seats.iter().map(SeatResponse::from).collect(),
    }))
}

fn booking_id(raw: i64) -> Result<BookingId, ApiError> {
    BookingId::new(raw).map_err(|e| ApiError(BookingError::from(e)))
}
