//! Showtime read model.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MovieId, ShowtimeId, TheaterId};

/// A scheduled screening of a movie in a theater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub id: ShowtimeId,
    pub movie_id: MovieId,
    pub theater_id: TheaterId,
    pub date: NaiveDate,
    /// Wall-clock start time as stored by the catalog, e.g. `"19:30"`.
    pub time: String,
    pub price: Decimal,
    pub surcharge: Option<Decimal>,
}

impl Showtime {
    /// True when the screening falls on Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// True when the start time sorts after `threshold`.
    ///
    /// Times are compared as strings, so both sides must use the same
    /// zero-padded `HH:MM` form.
    pub fn starts_after(&self, threshold: &str) -> bool {
        self.time.as_str() > threshold
    }

    /// The showtime's own surcharge, zero when absent.
    pub fn surcharge_or_zero(&self) -> Decimal {
        self.surcharge.unwrap_or(Decimal::ZERO)
    }
}
