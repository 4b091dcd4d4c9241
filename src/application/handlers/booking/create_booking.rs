//! CreateBookingHandler - Command handler for creating pending bookings.
//!
//! Validation and pricing run first (`prepare`), persistence second
//! (`persist`), so higher-level flows can inspect the price before anything
//! is written.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::booking::{
    compute_price, Booking, BookingCode, BookingError, ContactInfo, NewBooking, PaymentMethod,
    PriceBreakdown, PricingPolicy,
};
use crate::domain::catalog::{Rider, Seat, Showtime};
use crate::domain::foundation::{PromotionId, SeatId, ShowtimeId, Timestamp, UserId};
use crate::ports::{BookingRepository, CatalogReader, InsertBookingError, UserDirectory};

/// Attempts at finding an unused booking code.
const MAX_CODE_ATTEMPTS: usize = 3;

/// Used when the booking carries no uploaded image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=Cinema+Ticket";

/// Command to create a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub user_id: UserId,
    pub showtime_id: ShowtimeId,
    pub seat_ids: Vec<SeatId>,
    pub contact: ContactInfo,
    pub payment_method: Option<PaymentMethod>,
    pub promotion_id: Option<PromotionId>,
    /// Blob-store URL of an uploaded image, if the upload succeeded.
    pub image_url: Option<String>,
}

/// A validated, priced booking that has not been written yet.
#[derive(Debug, Clone)]
pub struct PreparedBooking {
    pub command: CreateBookingCommand,
    pub showtime: Showtime,
    pub seats: Vec<Seat>,
    pub rider: Rider,
    pub price: PriceBreakdown,
}

/// Result of successful booking creation.
#[derive(Debug, Clone)]
pub struct CreateBookingResult {
    pub booking: Booking,
    pub showtime: Showtime,
    pub seats: Vec<Seat>,
    pub price: PriceBreakdown,
}

/// Handler for creating bookings.
pub struct CreateBookingHandler {
    catalog: Arc<dyn CatalogReader>,
    users: Arc<dyn UserDirectory>,
    bookings: Arc<dyn BookingRepository>,
    pricing: PricingPolicy,
}

impl CreateBookingHandler {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        users: Arc<dyn UserDirectory>,
        bookings: Arc<dyn BookingRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            catalog,
            users,
            bookings,
            pricing,
        }
    }

    pub async fn handle(&self, cmd: CreateBookingCommand) -> Result<CreateBookingResult, BookingError> {
        let prepared = self.prepare(cmd).await?;
        self.persist(prepared).await
    }

    /// Validates the request against the catalog and current holds, then prices it.
    pub async fn prepare(&self, cmd: CreateBookingCommand) -> Result<PreparedBooking, BookingError> {
        validate_seat_list(&cmd.seat_ids)?;

        // 1. Showtime
        let showtime = self
            .catalog
            .find_showtime(cmd.showtime_id)
            .await?
            .ok_or(BookingError::ShowtimeNotFound(cmd.showtime_id))?;

        // 2. Seats must belong to the showtime's theater
        let found = self
            .catalog
            .find_seats(showtime.theater_id, &cmd.seat_ids)
            .await?;
        let missing: Vec<SeatId> = cmd
            .seat_ids
            .iter()
            .filter(|id| !found.iter().any(|seat| seat.id == **id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(BookingError::InvalidSeats(missing));
        }
        let seats: Vec<Seat> = cmd
            .seat_ids
            .iter()
            .filter_map(|id| found.iter().find(|seat| seat.id == *id).cloned())
            .collect();

        // 3. Advisory conflict check; the store's constraint is authoritative
        let held = self
            .bookings
            .find_held_seat_ids(showtime.id, &cmd.seat_ids)
            .await?;
        if !held.is_empty() {
            return Err(BookingError::SeatsAlreadyBooked(held));
        }

        // 4. Rider
        let rider = self
            .users
            .find_user(cmd.user_id)
            .await?
            .ok_or(BookingError::UserNotFound(cmd.user_id))?;

        // 5. Price
        let price = compute_price(&seats, rider.class, &showtime, &self.pricing);

        Ok(PreparedBooking {
            command: cmd,
            showtime,
            seats,
            rider,
            price,
        })
    }

    /// Writes the booking and its seat rows, retrying on booking-code collisions.
    pub async fn persist(&self, prepared: PreparedBooking) -> Result<CreateBookingResult, BookingError> {
        let PreparedBooking {
            command,
            showtime,
            seats,
            rider,
            price,
        } = prepared;

        let contact = command.contact.with_defaults_from(&rider);
        let image_url = command
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        let mut last_code = None;
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = BookingCode::generate();
            let new_booking = NewBooking {
                user_id: command.user_id,
                showtime_id: command.showtime_id,
                booking_code: code.clone(),
                total_price: price.total,
                contact: contact.clone(),
                payment_method: command.payment_method,
                promotion_id: command.promotion_id,
                image_url: Some(image_url.clone()),
                seat_ids: command.seat_ids.clone(),
                created_at: Timestamp::now(),
            };

            match self.bookings.insert(&new_booking).await {
                Ok(booking) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        booking_code = %booking.booking_code,
                        showtime_id = %booking.showtime_id,
                        seats = booking.seats.len(),
                        total_price = %booking.total_price,
                        "Booking created"
                    );
                    return Ok(CreateBookingResult {
                        booking,
                        showtime,
                        seats,
                        price,
                    });
                }
                Err(InsertBookingError::SeatsTaken(seat_ids)) => {
                    tracing::info!(
                        showtime_id = %command.showtime_id,
                        ?seat_ids,
                        "Seat conflict detected at commit"
                    );
                    return Err(BookingError::SeatsAlreadyBooked(seat_ids));
                }
                Err(InsertBookingError::DuplicateCode) => {
                    tracing::warn!(booking_code = %code, attempt, "Booking code collision");
                    last_code = Some(code);
                }
                Err(InsertBookingError::Storage(err)) => return Err(err.into()),
            }
        }

        Err(BookingError::DuplicateBookingCode(
            last_code.map(|c| c.to_string()).unwrap_or_default(),
        ))
    }
}

fn validate_seat_list(seat_ids: &[SeatId]) -> Result<(), BookingError> {
    if seat_ids.is_empty() {
        return Err(BookingError::validation(
            "seatIds",
            "At least one seat must be selected",
        ));
    }
    let unique: BTreeSet<&SeatId> = seat_ids.iter().collect();
    if unique.len() != seat_ids.len() {
        return Err(BookingError::validation("seatIds", "Seat ids must be unique"));
    }
    Ok(())
}
