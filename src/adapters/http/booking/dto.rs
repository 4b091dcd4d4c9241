//! HTTP DTOs for booking endpoints.
//!
//! Request and response bodies use camelCase field names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::{BookingPatch, BookingView, CreateBookingCommand};
use crate::domain::booking::{
    Booking, BookingError, BookingSeat, BookingSeatStatus, BookingStatus, ContactInfo,
    PaymentMethod, PriceBreakdown,
};
use crate::domain::catalog::{Seat, Showtime};
use crate::domain::foundation::{PromotionId, SeatId, ShowtimeId, UserId};
use crate::ports::{BookingPage, PaymentRedirect};

use crate::adapters::http::payment::dto::PaymentResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /bookings` and `POST /bookings/{gateway}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub user_id: i64,
    pub showtime_id: i64,
    pub seat_ids: Vec<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub promotion_id: Option<i64>,
    /// URL returned by the image upload service.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateBookingRequest {
    /// Validates ids and builds the application command.
    pub fn into_command(self) -> Result<CreateBookingCommand, BookingError> {
        let seat_ids = self
            .seat_ids
            .into_iter()
            .map(SeatId::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CreateBookingCommand {
            user_id: UserId::new(self.user_id)?,
            showtime_id: ShowtimeId::new(self.showtime_id)?,
            seat_ids,
            contact: ContactInfo {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone_number: self.phone_number,
            },
            payment_method: self.payment_method,
            promotion_id: self.promotion_id.map(PromotionId::new).transpose()?,
            image_url: self.image_url,
        })
    }
}

/// Body of `PATCH /bookings/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl From<UpdateBookingRequest> for BookingPatch {
    fn from(req: UpdateBookingRequest) -> Self {
        BookingPatch {
            status: req.status,
            payment_method: req.payment_method,
            image_url: req.image_url,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone_number: req.phone_number,
        }
    }
}

/// Query string of `GET /bookings`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBookingsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSeatResponse {
    pub seat_id: i64,
    pub status: BookingSeatStatus,
}

impl From<&BookingSeat> for BookingSeatResponse {
    fn from(seat: &BookingSeat) -> Self {
        Self {
            seat_id: seat.seat_id.value(),
            status: seat.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub booking_code: String,
    pub user_id: i64,
    pub showtime_id: i64,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub promotion_id: Option<i64>,
    pub image_url: Option<String>,
    pub seats: Vec<BookingSeatResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Booking> for BookingResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id.value(),
            booking_code: booking.booking_code.to_string(),
            user_id: booking.user_id.value(),
            showtime_id: booking.showtime_id.value(),
            total_price: booking.total_price,
            status: booking.status,
            first_name: booking.contact.first_name.clone(),
            last_name: booking.contact.last_name.clone(),
            email: booking.contact.email.clone(),
            phone_number: booking.contact.phone_number.clone(),
            payment_method: booking.payment_method,
            promotion_id: booking.promotion_id.map(|p| p.value()),
            image_url: booking.image_url.clone(),
            seats: booking.seats.iter().map(BookingSeatResponse::from).collect(),
            created_at: booking.created_at.as_datetime().to_rfc3339(),
            updated_at: booking.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub id: i64,
    pub theater_id: i64,
    pub row: String,
    pub number: i32,
    pub label: String,
    pub seat_type: String,
    pub price: Decimal,
}

impl From<&Seat> for SeatResponse {
    fn from(seat: &Seat) -> Self {
        Self {
            id: seat.id.value(),
            theater_id: seat.theater_id.value(),
            row: seat.row.clone(),
            number: seat.number,
            label: seat.label(),
            seat_type: seat.seat_type.clone(),
            price: seat.price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeResponse {
    pub id: i64,
    pub movie_id: i64,
    pub theater_id: i64,
    pub date: String,
    pub time: String,
    pub price: Decimal,
    pub surcharge: Option<Decimal>,
}

impl From<&Showtime> for ShowtimeResponse {
    fn from(showtime: &Showtime) -> Self {
        Self {
            id: showtime.id.value(),
            movie_id: showtime.movie_id.value(),
            theater_id: showtime.theater_id.value(),
            date: showtime.date.format("%Y-%m-%d").to_string(),
            time: showtime.time.clone(),
            price: showtime.price,
            surcharge: showtime.surcharge,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub base: Decimal,
    pub discounted: Decimal,
    pub peak_surcharge: Decimal,
    pub showtime_surcharge: Decimal,
    pub total: Decimal,
}

impl From<PriceBreakdown> for PriceResponse {
    fn from(price: PriceBreakdown) -> Self {
        Self {
            base: price.base,
            discounted: price.discounted,
            peak_surcharge: price.peak_surcharge,
            showtime_surcharge: price.showtime_surcharge,
            total: price.total,
        }
    }
}

/// Response of `POST /bookings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub showtime: ShowtimeResponse,
    pub seats: Vec<SeatResponse>,
    pub price: PriceResponse,
}

/// Where to send the customer to pay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    pub pay_url: String,
    pub qr_code_url: Option<String>,
    pub deeplink: Option<String>,
}

impl From<&PaymentRedirect> for RedirectResponse {
    fn from(redirect: &PaymentRedirect) -> Self {
        Self {
            pay_url: redirect.redirect_url.clone(),
            qr_code_url: redirect.qr_code_url.clone(),
            deeplink: redirect.deeplink.clone(),
        }
    }
}

/// Response of `POST /bookings/{gateway}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingWithPaymentResponse {
    pub booking: BookingResponse,
    pub showtime: ShowtimeResponse,
    pub seats: Vec<SeatResponse>,
    pub price: PriceResponse,
    pub payment: PaymentResponse,
    pub redirect: RedirectResponse,
}

/// Response of `GET /bookings/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailResponse {
    pub booking: BookingResponse,
    pub showtime: Option<ShowtimeResponse>,
    pub seats: Vec<SeatResponse>,
    pub payments: Vec<PaymentResponse>,
}

impl From<BookingView> for BookingDetailResponse {
    fn from(view: BookingView) -> Self {
        Self {
            booking: BookingResponse::from(&view.booking),
            showtime: view.showtime.as_ref().map(ShowtimeResponse::from),
            seats: view.seats.iter().map(SeatResponse::from).collect(),
            payments: view.payments.iter().map(PaymentResponse::from).collect(),
        }
    }
}

/// Response of `GET /bookings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListResponse {
    pub items: Vec<BookingResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<BookingPage> for BookingListResponse {
    fn from(page: BookingPage) -> Self {
        Self {
            items: page.items.iter().map(BookingResponse::from).collect(),
            total: page.total,
            page: page.page.page,
            limit: page.page.limit,
        }
    }
}

/// Response of `DELETE /bookings/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingResponse {
    pub booking: BookingResponse,
    /// False when the booking was already cancelled.
    pub changed: bool,
}

/// Response of `GET /showtimes/{id}/available-seats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSeatsResponse {
    pub showtime: ShowtimeResponse,
    pub seats: Vec<SeatResponse>,
}
