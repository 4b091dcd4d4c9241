//! ExpireStaleBookingsHandler - Releases seats held by abandoned bookings.
//!
//! A booking still pending after the TTL is cancelled together with its seat
//! rows, one atomic unit per booking. Its payment attempts are left alone so
//! a provider outcome that arrives later is still recorded. A failure on one
//! booking is logged and the sweep moves on.

use std::sync::Arc;

use crate::domain::booking::{BookingCode, BookingError};
use crate::domain::foundation::Timestamp;
use crate::ports::BookingRepository;

#[derive(Debug, Clone)]
pub struct ExpireStaleBookingsCommand {
    pub now: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct ExpireStaleBookingsResult {
    pub expired: Vec<BookingCode>,
    pub failed: usize,
}

pub struct ExpireStaleBookingsHandler {
    bookings: Arc<dyn BookingRepository>,
    pending_ttl_secs: i64,
    batch_size: u32,
}

impl ExpireStaleBookingsHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, pending_ttl_secs: i64, batch_size: u32) -> Self {
        Self {
            bookings,
            pending_ttl_secs,
            batch_size,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExpireStaleBookingsCommand,
    ) -> Result<ExpireStaleBookingsResult, BookingError> {
        let cutoff = cmd.now.minus_secs(self.pending_ttl_secs);
        let stale = self
            .bookings
            .find_stale_pending(cutoff, self.batch_size)
            .await?;

        let mut result = ExpireStaleBookingsResult::default();
        for booking in stale {
            match self.bookings.expire(booking.id, cmd.now).await {
                Ok(true) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        booking_code = %booking.booking_code,
                        "Stale pending booking expired"
                    );
                    result.expired.push(booking.booking_code);
                }
                // Settled between the read and the write
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(
                        booking_id = %booking.id,
                        error = %err,
                        "Failed to expire stale booking"
                    );
                    result.failed += 1;
                }
            }
        }

        if !result.expired.is_empty() || result.failed > 0 {
            tracing::info!(
                expired = result.expired.len(),
                failed = result.failed,
                "Stale booking sweep finished"
            );
        }
        Ok(result)
    }
}
