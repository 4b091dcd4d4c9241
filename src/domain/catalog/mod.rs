//! Catalog read models.
//!
//! Showtimes, seats and users are owned by collaborators outside the booking
//! core. The types here are the read-only projections the core needs.

mod rider;
mod seat;
mod showtime;

pub use rider::{Rider, RiderClass};
pub use seat::Seat;
pub use showtime::Showtime;
