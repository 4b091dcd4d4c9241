//! GetBookingHandler - Query handler for one booking with its context.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::catalog::{Seat, Showtime};
use crate::domain::foundation::BookingId;
use crate::domain::payment::Payment;
use crate::ports::{BookingRepository, CatalogReader, PaymentRepository};

/// Query to get a booking.
#[derive(Debug, Clone)]
pub struct GetBookingQuery {
    pub booking_id: BookingId,
}

/// A booking with the showtime, seats and payment attempts it references.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    /// Absent when the catalog no longer has the showtime.
    pub showtime: Option<Showtime>,
    /// In booking order.
    pub seats: Vec<Seat>,
    /// Newest first.
    pub payments: Vec<Payment>,
}

pub type GetBookingResult = BookingView;

pub struct GetBookingHandler {
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    catalog: Arc<dyn CatalogReader>,
}

impl GetBookingHandler {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        catalog: Arc<dyn CatalogReader>,
    ) -> Self {
        Self {
            bookings,
            payments,
            catalog,
        }
    }

    pub async fn handle(&self, query: GetBookingQuery) -> Result<GetBookingResult, BookingError> {
        let booking = self
            .bookings
            .find_by_id(query.booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(query.booking_id))?;

        let showtime = self.catalog.find_showtime(booking.showtime_id).await?;
        let seats = match &showtime {
            Some(showtime) => {
                let ids = booking.seat_ids();
                let mut seats = self.catalog.find_seats(showtime.theater_id, &ids).await?;
                seats.sort_by_key(|seat| ids.iter().position(|id| *id == seat.id));
                seats
            }
            None => Vec::new(),
        };
        let payments = self.payments.list_by_booking(booking.id).await?;

        Ok(BookingView {
            booking,
            showtime,
            seats,
            payments,
        })
    }
}
