//! Booking repository port.
//!
//! # Storage guarantees
//!
//! Implementations must enforce, at the storage layer:
//!
//! - at most one `booked` seat assignment per (showtime, seat)
//! - unique booking codes
//! - booking + seat rows written in one atomic unit, for inserts and for
//!   every status transition
//!
//! The application-level availability check is only a fast path; two
//! concurrent inserts that both pass it must see exactly one succeed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingCode, BookingStatus, NewBooking};
use crate::domain::foundation::{BookingId, DomainError, SeatId, ShowtimeId, Timestamp, UserId};

/// Why an insert was refused.
#[derive(Debug, Clone)]
pub enum InsertBookingError {
    /// Another booking holds some of the seats for this showtime.
    SeatsTaken(Vec<SeatId>),
    /// The booking code already exists.
    DuplicateCode,
    Storage(DomainError),
}

impl From<DomainError> for InsertBookingError {
    fn from(err: DomainError) -> Self {
        InsertBookingError::Storage(err)
    }
}

/// Outcome of a write guarded by the expected current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    Written,
    /// Nothing was written; the stored status had already moved on.
    StatusChanged(BookingStatus),
}

/// Page selection for administrative listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const MAX_LIMIT: u32 = 100;

    /// Clamps page to at least 1 and limit into `1..=MAX_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// One page of bookings plus the total count.
#[derive(Debug, Clone)]
pub struct BookingPage {
    pub items: Vec<Booking>,
    pub total: u64,
    pub page: PageRequest,
}

/// Repository port for the booking aggregate.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a pending booking and one `booked` seat row per seat, atomically.
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, InsertBookingError>;

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, DomainError>;

    async fn find_by_code(&self, code: &BookingCode) -> Result<Option<Booking>, DomainError>;

    /// A user's bookings, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, DomainError>;

    /// All bookings, newest first.
    async fn list(&self, page: PageRequest) -> Result<BookingPage, DomainError>;

    /// Which of `seat_ids` are currently held for the showtime.
    async fn find_held_seat_ids(
        &self,
        showtime_id: ShowtimeId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<SeatId>, DomainError>;

    /// Every seat currently held for the showtime.
    async fn list_held_seat_ids(&self, showtime_id: ShowtimeId) -> Result<Vec<SeatId>, DomainError>;

    /// Persist a status change made on the aggregate.
    ///
    /// Writes status, payment method and seat statuses in one atomic unit,
    /// but only if the stored status still equals `expected`. Returns `false`
    /// when another writer got there first.
    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<bool, DomainError>;

    /// Persist an administrative edit: contact, payment method, image and status.
    ///
    /// Same guard and atomicity as `save_transition`; seats are released when
    /// the new status is cancelled. Price and seat assignments are never written.
    async fn save_update(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<GuardedWrite, DomainError>;

    /// Pending bookings created before `created_before`, oldest first.
    async fn find_stale_pending(
        &self,
        created_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<Booking>, DomainError>;

    /// Cancel a still-pending booking and release its seats atomically.
    ///
    /// Payments are left as they are, so a provider outcome that arrives
    /// later is still recorded. Returns `false` if the booking was no longer
    /// pending.
    async fn expire(&self, id: BookingId, now: Timestamp) -> Result<bool, DomainError>;
}
