//! Strongly-typed identifier value objects.
//!
//! Every row in the booking core is keyed by a positive `BIGINT`. The newtypes
//! below keep a `SeatId` from ever being passed where a `ShowtimeId` is
//! expected, and reject zero or negative values at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates an id, rejecting zero and negative values.
            pub fn new(value: i64) -> Result<Self, ValidationError> {
                if value <= 0 {
                    return Err(ValidationError::not_positive($field, value));
                }
                Ok(Self(value))
            }

            /// Wraps a value read back from storage without re-validating it.
            pub fn from_raw(value: i64) -> Self {
                Self(value)
            }

            /// Returns the inner integer.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = ValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s.trim().parse::<i64>().map_err(|_| {
                    ValidationError::invalid_format($field, format!("'{}' is not an integer", s))
                })?;
                Self::new(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a booking aggregate.
    BookingId,
    "booking_id"
);

numeric_id!(
    /// Identifier of a scheduled screening.
    ShowtimeId,
    "showtime_id"
);

numeric_id!(
    /// Identifier of a physical seat within a theater.
    SeatId,
    "seat_id"
);

numeric_id!(TheaterId, "theater_id");

numeric_id!(MovieId, "movie_id");

numeric_id!(
    /// Identifier of a user in the user directory.
    UserId,
    "user_id"
);

numeric_id!(
    /// Identifier of one payment attempt.
    PaymentId,
    "payment_id"
);

numeric_id!(PromotionId, "promotion_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_ids_are_accepted() {
        let id = SeatId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn zero_and_negative_ids_are_rejected() {
        assert!(BookingId::new(0).is_err());
        assert!(ShowtimeId::new(-3).is_err());
    }

    #[test]
    fn from_str_parses_and_validates() {
        assert_eq!("17".parse::<UserId>().unwrap().value(), 17);
        assert!("abc".parse::<UserId>().is_err());
        assert!("0".parse::<UserId>().is_err());
    }

    #[test]
    fn deserialization_rejects_non_positive_values() {
        let ok: Result<Vec<SeatId>, _> = serde_json::from_str("[1, 2, 3]");
        assert_eq!(ok.unwrap().len(), 3);

        let bad: Result<Vec<SeatId>, _> = serde_json::from_str("[1, -2]");
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&BookingId::new(9).unwrap()).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn error_names_the_offending_field() {
        let err = PaymentId::new(0).unwrap_err();
        assert!(err.to_string().contains("payment_id"));
    }
}
