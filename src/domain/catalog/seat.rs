//! Seat read model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SeatId, TheaterId};

/// A physical seat in a theater, reusable across showtimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub theater_id: TheaterId,
    pub row: String,
    pub number: i32,
    pub seat_type: String,
    pub price: Decimal,
}

impl Seat {
    /// Human label such as `"C7"`.
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.number)
    }
}
