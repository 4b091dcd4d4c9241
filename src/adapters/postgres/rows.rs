//! Row types shared by the PostgreSQL repositories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::booking::{
    Booking, BookingCode, BookingSeat, BookingSeatStatus, BookingStatus, ContactInfo,
    PaymentMethod,
};
use crate::domain::foundation::{
    BookingId, DomainError, PaymentId, PromotionId, SeatId, ShowtimeId, Timestamp, UserId,
};
use crate::domain::payment::{GatewayKind, Payment, PaymentStatus};

pub(super) const BOOKING_COLUMNS: &str = "id, user_id, showtime_id, booking_code, total_price, \
     status, first_name, last_name, email, phone_number, payment_method, promotion_id, \
     image_url, created_at, updated_at";

pub(super) const PAYMENT_COLUMNS: &str = "id, booking_id, order_id, request_id, amount, provider, \
     status, transaction_id, result_code, message, signature, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct BookingRow {
    pub id: i64,
    pub user_id: i64,
    pub showtime_id: i64,
    pub booking_code: String,
    pub total_price: Decimal,
    pub status: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub payment_method: Option<String>,
    pub promotion_id: Option<i64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct BookingSeatRow {
    pub booking_id: i64,
    pub showtime_id: i64,
    pub seat_id: i64,
    pub status: String,
}

impl BookingRow {
    /// Builds the aggregate from its row and the seat rows that belong to it.
    pub fn into_booking(self, seats: Vec<BookingSeatRow>) -> Result<Booking, DomainError> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            DomainError::database(format!("Invalid booking status: {}", self.status))
        })?;
        let payment_method = self
            .payment_method
            .as_deref()
            .map(|m| {
                PaymentMethod::parse(m)
                    .ok_or_else(|| DomainError::database(format!("Invalid payment method: {}", m)))
            })
            .transpose()?;
        let seats = seats
            .into_iter()
            .map(BookingSeatRow::into_seat)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Booking {
            id: BookingId::from_raw(self.id),
            user_id: UserId::from_raw(self.user_id),
            showtime_id: ShowtimeId::from_raw(self.showtime_id),
            booking_code: BookingCode::from_raw(self.booking_code),
            total_price: self.total_price,
            status,
            contact: ContactInfo {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone_number: self.phone_number,
            },
            payment_method,
            promotion_id: self.promotion_id.map(PromotionId::from_raw),
            image_url: self.image_url,
            seats,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}

impl BookingSeatRow {
    fn into_seat(self) -> Result<BookingSeat, DomainError> {
        let status = BookingSeatStatus::parse(&self.status).ok_or_else(|| {
            DomainError::database(format!("Invalid booking seat status: {}", self.status))
        })?;
        Ok(BookingSeat {
            seat_id: SeatId::from_raw(self.seat_id),
            showtime_id: ShowtimeId::from_raw(self.showtime_id),
            status,
        })
    }
}

/// Groups seat rows by booking and assembles each aggregate in row order.
pub(super) fn assemble_bookings(
    rows: Vec<BookingRow>,
    seats: Vec<BookingSeatRow>,
) -> Result<Vec<Booking>, DomainError> {
    let mut by_booking: std::collections::HashMap<i64, Vec<BookingSeatRow>> =
        std::collections::HashMap::new();
    for seat in seats {
        by_booking.entry(seat.booking_id).or_default().push(seat);
    }
    rows.into_iter()
        .map(|row| {
            let seats = by_booking.remove(&row.id).unwrap_or_default();
            row.into_booking(seats)
        })
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PaymentRow {
    pub id: i64,
    pub booking_id: i64,
    pub order_id: String,
    pub request_id: Option<String>,
    pub amount: i64,
    pub provider: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub message: Option<String>,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let provider = GatewayKind::parse(&row.provider).ok_or_else(|| {
            DomainError::database(format!("Invalid payment provider: {}", row.provider))
        })?;
        let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
            DomainError::database(format!("Invalid payment status: {}", row.status))
        })?;

        Ok(Payment {
            id: PaymentId::from_raw(row.id),
            booking_id: BookingId::from_raw(row.booking_id),
            order_id: row.order_id,
            request_id: row.request_id,
            amount: row.amount,
            provider,
            status,
            transaction_id: row.transaction_id,
            result_code: row.result_code,
            message: row.message,
            signature: row.signature,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

pub(super) const ACTIVE_SEAT_INDEX: &str = "booking_seats_active_uniq";
pub(super) const BOOKING_CODE_KEY: &str = "bookings_booking_code_key";
pub(super) const ONE_PENDING_INDEX: &str = "payments_one_pending_per_booking";
pub(super) const PAYMENT_BOOKING_FK: &str = "payments_booking_id_fkey";

/// Constraint violations the repositories turn into domain outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Conflict {
    SeatTaken,
    DuplicateCode,
    PendingPayment,
    UnknownBooking,
}

impl Conflict {
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            ACTIVE_SEAT_INDEX => Some(Self::SeatTaken),
            BOOKING_CODE_KEY => Some(Self::DuplicateCode),
            ONE_PENDING_INDEX => Some(Self::PendingPayment),
            PAYMENT_BOOKING_FK => Some(Self::UnknownBooking),
            _ => None,
        }
    }
}

/// The known constraint a database error violated, if any.
pub(super) fn conflict(err: &sqlx::Error) -> Option<Conflict> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().and_then(Conflict::from_constraint),
        _ => None,
    }
}

pub(super) fn db_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}
