//! Pricing engine.
//!
//! `compute_price` is a pure function of the seats, the rider's class and the
//! showtime. Amounts keep full decimal precision here; conversion to the
//! whole-unit amounts gateways require happens in [`round_to_currency_unit`],
//! which callers apply only when building a payment request.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{RiderClass, Seat, Showtime};

/// Tunable pricing constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Multiplier applied to the seat total for students (0.8 = 20% off).
    pub student_discount: Decimal,

    /// Flat amount added for weekend or evening screenings.
    pub peak_surcharge: Decimal,

    /// Screenings starting strictly after this `HH:MM` are peak.
    pub evening_threshold: String,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            student_discount: Decimal::new(8, 1),
            peak_surcharge: Decimal::new(20_000, 0),
            evening_threshold: "18:00".to_string(),
        }
    }
}

impl PricingPolicy {
    /// Weekend days and evening start times are peak.
    pub fn is_peak(&self, showtime: &Showtime) -> bool {
        showtime.is_weekend() || showtime.starts_after(&self.evening_threshold)
    }
}

/// Itemised result of a price computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Sum of seat prices.
    pub base: Decimal,
    /// Base after the rider discount.
    pub discounted: Decimal,
    pub peak_surcharge: Decimal,
    pub showtime_surcharge: Decimal,
    pub total: Decimal,
}

/// Computes the total for a set of seats.
///
/// Order: seat sum, then rider discount, then the peak surcharge, then the
/// showtime's own surcharge. Surcharges are never discounted.
pub fn compute_price(
    seats: &[Seat],
    rider: RiderClass,
    showtime: &Showtime,
    policy: &PricingPolicy,
) -> PriceBreakdown {
    let base: Decimal = seats.iter().map(|seat| seat.price).sum();

    let discounted = match rider {
        RiderClass::Student => base * policy.student_discount,
        RiderClass::Standard => base,
    };

    let peak_surcharge = if policy.is_peak(showtime) {
        policy.peak_surcharge
    } else {
        Decimal::ZERO
    };

    let showtime_surcharge = showtime.surcharge_or_zero();

    PriceBreakdown {
        base,
        discounted,
        peak_surcharge,
        showtime_surcharge,
        total: discounted + peak_surcharge + showtime_surcharge,
    }
}

/// Rounds half away from zero to whole currency units.
///
/// Returns `None` when the amount does not fit an `i64`.
pub fn round_to_currency_unit(amount: Decimal) -> Option<i64> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
