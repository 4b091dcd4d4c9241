//! ListAvailableSeatsHandler - Seats of a showtime's theater not held for it.
//!
//! Always reads the store; the answer gates the next booking attempt.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::booking::BookingError;
use crate::domain::catalog::{Seat, Showtime};
use crate::domain::foundation::ShowtimeId;
use crate::ports::{BookingRepository, CatalogReader};

#[derive(Debug, Clone)]
pub struct ListAvailableSeatsQuery {
    pub showtime_id: ShowtimeId,
}

#[derive(Debug, Clone)]
pub struct ListAvailableSeatsResult {
    pub showtime: Showtime,
    /// Ordered by row then number.
    pub seats: Vec<Seat>,
}

pub struct ListAvailableSeatsHandler {
    catalog: Arc<dyn CatalogReader>,
    bookings: Arc<dyn BookingRepository>,
}

impl ListAvailableSeatsHandler {
    pub fn new(catalog: Arc<dyn CatalogReader>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { catalog, bookings }
    }

    pub async fn handle(
        &self,
        query: ListAvailableSeatsQuery,
    ) -> Result<ListAvailableSeatsResult, BookingError> {
        let showtime = self
            .catalog
            .find_showtime(query.showtime_id)
            .await?
            .ok_or(BookingError::ShowtimeNotFound(query.showtime_id))?;

        let all = self.catalog.list_theater_seats(showtime.theater_id).await?;
        let held: HashSet<_> = self
            .bookings
            .list_held_seat_ids(showtime.id)
            .await?
            .into_iter()
            .collect();

        let seats = all
            .into_iter()
            .filter(|seat| !held.contains(&seat.id))
            .collect();

        Ok(ListAvailableSeatsResult { showtime, seats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::booking::{
        CancelBookingCommand, CancelBookingHandler, CreateBookingHandler,
    };
    use crate::application::handlers::test_support::*;
    use crate::domain::booking::PricingPolicy;
    use crate::domain::foundation::SeatId;

    fn ids(result: &ListAvailableSeatsResult) -> Vec<i64> {
        result.seats.iter().map(|s| s.id.value()).collect()
    }

    #[tokio::test]
    async fn held_seats_are_scoped_to_their_showtime() {
        let store = seeded_store();
        CreateBookingHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            PricingPolicy::default(),
        )
        .handle(booking_command(STANDARD_USER, OFF_PEAK_SHOWTIME, &[1, 2]))
        .await
        .unwrap();

        let handler = ListAvailableSeatsHandler::new(store.clone(), store);
        let off_peak = handler
            .handle(ListAvailableSeatsQuery {
                showtime_id: ShowtimeId::from_raw(OFF_PEAK_SHOWTIME),
            })
            .await
            .unwrap();
        let peak = handler
            .handle(ListAvailableSeatsQuery {
                showtime_id: ShowtimeId::from_raw(PEAK_SHOWTIME),
            })
            .await
            .unwrap();

        assert_eq!(ids(&off_peak), vec![3, 4, 5]);
        assert_eq!(ids(&peak), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn cancelled_seats_reappear() {
        let store = seeded_store();
        let booking = CreateBookingHandler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            PricingPolicy::default(),
        )
        .handle(booking_command(STANDARD_USER, OFF_PEAK_SHOWTIME, &[1]))
        .await
        .unwrap()
        .booking;
        CancelBookingHandler::new(store.clone())
            .handle(CancelBookingCommand {
                booking_id: booking.id,
            })
            .await
            .unwrap();

        let result = ListAvailableSeatsHandler::new(store.clone(), store)
            .handle(ListAvailableSeatsQuery {
                showtime_id: ShowtimeId::from_raw(OFF_PEAK_SHOWTIME),
            })
            .await
            .unwrap();
        assert!(result.seats.iter().any(|s| s.id == SeatId::from_raw(1)));
    }

    #[tokio::test]
    async fn unknown_showtime_is_not_found() {
        let store = seeded_store();
        let err = ListAvailableSeatsHandler::new(store.clone(), store)
            .handle(ListAvailableSeatsQuery {
                showtime_id: ShowtimeId::from_raw(77),
            })
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::ShowtimeNotFound(ShowtimeId::from_raw(77)));
    }
}
