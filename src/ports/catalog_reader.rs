//! Catalog and user directory ports.
//!
//! Showtimes, seats and users are owned by collaborators outside the booking
//! core. These read-only contracts are all the core needs from them. Every
//! call must hit authoritative storage; seat availability decisions depend on
//! it.

use async_trait::async_trait;

use crate::domain::catalog::{Rider, Seat, Showtime};
use crate::domain::foundation::{DomainError, SeatId, ShowtimeId, TheaterId, UserId};

/// Read access to showtimes and seats.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Find a showtime by id. Returns `None` if absent.
    async fn find_showtime(&self, id: ShowtimeId) -> Result<Option<Showtime>, DomainError>;

    /// Seats of `theater_id` whose ids are in `seat_ids`.
    ///
    /// Ids that do not belong to the theater are silently omitted; callers
    /// compare the result with their request to detect them.
    async fn find_seats(
        &self,
        theater_id: TheaterId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<Seat>, DomainError>;

    /// All seats of a theater, ordered by row then number.
    async fn list_theater_seats(&self, theater_id: TheaterId) -> Result<Vec<Seat>, DomainError>;
}

/// Read access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by id. Returns `None` if absent.
    async fn find_user(&self, id: UserId) -> Result<Option<Rider>, DomainError>;
}
