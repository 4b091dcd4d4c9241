//! Booking aggregate.
//!
//! A booking owns its seat assignments. It references, but never copies, the
//! showtime and the seats themselves.
//!
//! # Invariants
//!
//! - The set of seat ids is fixed at creation
//! - `booking_code` is immutable and unique across all bookings
//! - `total_price` is computed once by the pricing engine and never recomputed
//! - A cancelled booking has every seat assignment cancelled

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Rider;
use crate::domain::foundation::{
    BookingId, PromotionId, SeatId, ShowtimeId, StateMachine, Timestamp, UserId,
};

use super::{BookingCode, BookingError, BookingSeatStatus, BookingStatus};

/// How a booking was (or will be) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Momo,
    Vnpay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Momo => "MOMO",
            PaymentMethod::Vnpay => "VNPAY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CASH" => Some(PaymentMethod::Cash),
            "CARD" => Some(PaymentMethod::Card),
            "MOMO" => Some(PaymentMethod::Momo),
            "VNPAY" => Some(PaymentMethod::Vnpay),
            _ => None,
        }
    }
}

/// Contact details printed on the ticket and used for the confirmation mail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl ContactInfo {
    /// Fills missing name and e-mail from the user directory record.
    pub fn with_defaults_from(mut self, rider: &Rider) -> Self {
        if self.email.is_none() {
            self.email = rider.email.clone();
        }
        if self.first_name.is_none() && self.last_name.is_none() {
            self.first_name = rider.name.clone();
        }
        self
    }

    /// `"First Last"`, or whichever half is present.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

/// One seat held by a booking for its showtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSeat {
    pub seat_id: SeatId,
    pub showtime_id: ShowtimeId,
    pub status: BookingSeatStatus,
}

/// Booking aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub showtime_id: ShowtimeId,
    pub booking_code: BookingCode,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub contact: ContactInfo,
    pub payment_method: Option<PaymentMethod>,
    pub promotion_id: Option<PromotionId>,
    pub image_url: Option<String>,
    pub seats: Vec<BookingSeat>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|s| s.seat_id).collect()
    }

    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Marks the booking paid.
    ///
    /// Only a pending booking can be confirmed.
    pub fn confirm(&mut self, method: PaymentMethod, now: Timestamp) -> Result<(), BookingError> {
        self.status = self
            .status
            .transition_to(BookingStatus::Confirmed)
            .map_err(|_| BookingError::invalid_state(self.status.as_str(), "confirm"))?;
        self.payment_method = Some(method);
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the booking and releases every seat.
    ///
    /// Returns `Ok(false)` without touching anything when the booking is
    /// already cancelled. A confirmed booking cannot be cancelled.
    pub fn cancel(&mut self, now: Timestamp) -> Result<bool, BookingError> {
        if self.status == BookingStatus::Cancelled {
            return Ok(false);
        }
        self.status = self
            .status
            .transition_to(BookingStatus::Cancelled)
            .map_err(|_| BookingError::invalid_state(self.status.as_str(), "cancel"))?;
        for seat in &mut self.seats {
            seat.status = BookingSeatStatus::Cancelled;
        }
        self.updated_at = now;
        Ok(true)
    }
}

/// A booking about to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: UserId,
    pub showtime_id: ShowtimeId,
    pub booking_code: BookingCode,
    pub total_price: Decimal,
    pub contact: ContactInfo,
    pub payment_method: Option<PaymentMethod>,
    pub promotion_id: Option<PromotionId>,
    pub image_url: Option<String>,
    pub seat_ids: Vec<SeatId>,
    pub created_at: Timestamp,
}

impl NewBooking {
    /// Materialises the pending booking under the id the store assigned.
    pub fn into_booking(self, id: BookingId) -> Booking {
        let seats = self
            .seat_ids
            .iter()
            .map(|seat_id| BookingSeat {
                seat_id: *seat_id,
                showtime_id: self.showtime_id,
                status: BookingSeatStatus::Booked,
            })
            .collect();

        Booking {
            id,
            user_id: self.user_id,
            showtime_id: self.showtime_id,
            booking_code: self.booking_code,
            total_price: self.total_price,
            status: BookingStatus::Pending,
            contact: self.contact,
            payment_method: self.payment_method,
            promotion_id: self.promotion_id,
            image_url: self.image_url,
            seats,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pending_booking() -> Booking {
        NewBooking {
            user_id: UserId::from_raw(1),
            showtime_id: ShowtimeId::from_raw(10),
            booking_code: BookingCode::from_raw("BK-1-abcdefg"),
            total_price: dec!(220),
            contact: ContactInfo::default(),
            payment_method: None,
            promotion_id: None,
            image_url: None,
            seat_ids: vec![SeatId::from_raw(1), SeatId::from_raw(2)],
            created_at: Timestamp::now(),
        }
        .into_booking(BookingId::from_raw(5))
    }

    #[test]
    fn new_booking_starts_pending_with_booked_seats() {
        let booking = pending_booking();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.seats.len(), 2);
        assert!(booking
            .seats
            .iter()
            .all(|s| s.status == BookingSeatStatus::Booked && s.showtime_id == booking.showtime_id));
    }

    #[test]
    fn confirm_records_payment_method() {
        let mut booking = pending_booking();
        booking.confirm(PaymentMethod::Momo, Timestamp::now()).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_method, Some(PaymentMethod::Momo));
    }

    #[test]
    fn cancel_releases_all_seats() {
        let mut booking = pending_booking();
        assert!(booking.cancel(Timestamp::now()).unwrap());
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking
            .seats
            .iter()
            .all(|s| s.status == BookingSeatStatus::Cancelled));
    }

    #[test]
    fn cancel_twice_is_a_no_op() {
        let mut booking = pending_booking();
        booking.cancel(Timestamp::now()).unwrap();
        let snapshot = booking.clone();

        assert!(!booking.cancel(Timestamp::now()).unwrap());
        assert_eq!(booking, snapshot);
    }

    #[test]
    fn confirmed_booking_cannot_be_cancelled() {
        let mut booking = pending_booking();
        booking.confirm(PaymentMethod::Vnpay, Timestamp::now()).unwrap();
        let err = booking.cancel(Timestamp::now()).unwrap_err();
        assert!(matches!(err, BookingError::InvalidState { .. }));
    }

    #[test]
    fn cancelled_booking_cannot_be_confirmed() {
        let mut booking = pending_booking();
        booking.cancel(Timestamp::now()).unwrap();
        assert!(booking.confirm(PaymentMethod::Cash, Timestamp::now()).is_err());
        assert_eq!(booking.payment_method, None);
    }

    #[test]
    fn contact_defaults_come_from_directory() {
        let rider = Rider::new(
            UserId::from_raw(1),
            "user",
            Some("an@example.com".to_string()),
            Some("An Nguyen".to_string()),
        );
        let contact = ContactInfo {
            phone_number: Some("0900000000".to_string()),
            ..Default::default()
        }
        .with_defaults_from(&rider);

        assert_eq!(contact.email.as_deref(), Some("an@example.com"));
        assert_eq!(contact.full_name().as_deref(), Some("An Nguyen"));
    }

    #[test]
    fn explicit_contact_wins_over_directory() {
        let rider = Rider::new(UserId::from_raw(1), "user", Some("dir@example.com".to_string()), None);
        let contact = ContactInfo {
            email: Some("given@example.com".to_string()),
            ..Default::default()
        }
        .with_defaults_from(&rider);
        assert_eq!(contact.email.as_deref(), Some("given@example.com"));
    }

    #[test]
    fn payment_method_parses_case_insensitively() {
        assert_eq!(PaymentMethod::parse("momo"), Some(PaymentMethod::Momo));
        assert_eq!(PaymentMethod::parse("VNPAY"), Some(PaymentMethod::Vnpay));
        assert_eq!(PaymentMethod::parse("paypal"), None);
    }
}
