//! Booking and booking-seat status state machines.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle of a booking.
///
/// A booking starts `Pending` and is settled exactly once, either by a
/// payment outcome, an explicit cancellation, or the stale-booking sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Seats are held, payment not yet settled.
    Pending,

    /// Payment succeeded. Seats stay held.
    Confirmed,

    /// Seats released.
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the storage representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl StateMachine for BookingStatus {
    const FIELD: &'static str = "booking_status";

    fn successors(&self) -> &'static [Self] {
        use BookingStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed | Cancelled => &[],
        }
    }
}

/// Status of one seat assignment inside a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingSeatStatus {
    /// Seat is held for the showtime.
    Booked,

    /// Seat released back to inventory.
    Cancelled,
}

impl BookingSeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSeatStatus::Booked => "booked",
            BookingSeatStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "booked" => Some(BookingSeatStatus::Booked),
            "cancelled" => Some(BookingSeatStatus::Cancelled),
            _ => None,
        }
    }
}

impl StateMachine for BookingSeatStatus {
    const FIELD: &'static str = "seat_status";

    fn successors(&self) -> &'static [Self] {
        match self {
            BookingSeatStatus::Booked => &[BookingSeatStatus::Cancelled],
            BookingSeatStatus::Cancelled => &[],
        }
    }
}
