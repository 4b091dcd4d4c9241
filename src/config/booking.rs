//! Booking lifecycle and pricing configuration

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::booking::PricingPolicy;

use super::error::ValidationError;

/// Booking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Age after which an unpaid PENDING booking is swept
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: u64,

    /// How often the sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Maximum bookings expired per sweep
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: u32,

    /// Front-end page the gateway return redirects to
    #[serde(default = "default_confirmation_url")]
    pub confirmation_url: String,

    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Pricing knobs; see [`PricingPolicy`].
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_student_discount")]
    pub student_discount: Decimal,

    #[serde(default = "default_peak_surcharge")]
    pub peak_surcharge: Decimal,

    /// Showtimes strictly after this `HH:MM` are evening
    #[serde(default = "default_evening_threshold")]
    pub evening_threshold: String,
}

impl BookingConfig {
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            student_discount: self.pricing.student_discount,
            peak_surcharge: self.pricing.peak_surcharge,
            evening_threshold: self.pricing.evening_threshold.clone(),
        }
    }

    /// Validate booking configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pending_ttl_secs == 0 || self.sweep_interval_secs == 0 || self.sweep_batch_size == 0
        {
            return Err(ValidationError::InvalidSweepSchedule);
        }
        if !self.confirmation_url.starts_with("http://")
            && !self.confirmation_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("BOOKING__CONFIRMATION_URL"));
        }
        self.pricing.validate()
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.student_discount <= Decimal::ZERO || self.student_discount > Decimal::ONE {
            return Err(ValidationError::InvalidDiscount);
        }
        if self.peak_surcharge < Decimal::ZERO {
            return Err(ValidationError::InvalidSurcharge);
        }
        if !is_clock_time(&self.evening_threshold) {
            return Err(ValidationError::InvalidEveningThreshold);
        }
        Ok(())
    }
}

/// `HH:MM` with a two-digit hour below 24 and minute below 60.
fn is_clock_time(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return false;
    }
    matches!(
        (hours.parse::<u8>(), minutes.parse::<u8>()),
        (Ok(h), Ok(m)) if h < 24 && m < 60
    )
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: default_pending_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            sweep_batch_size: default_sweep_batch_size(),
            confirmation_url: default_confirmation_url(),
            pricing: PricingConfig::default(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            student_discount: default_student_discount(),
            peak_surcharge: default_peak_surcharge(),
            evening_threshold: default_evening_threshold(),
        }
    }
}

fn default_pending_ttl() -> u64 {
    900
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_batch_size() -> u32 {
    100
}

fn default_confirmation_url() -> String {
    "http://localhost:3000/booking/confirmation".to_string()
}

fn default_student_discount() -> Decimal {
    PricingPolicy::default().student_discount
}

fn default_peak_surcharge() -> Decimal {
    PricingPolicy::default().peak_surcharge
}

fn default_evening_threshold() -> String {
    PricingPolicy::default().evening_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_pricing_policy() {
        let config = BookingConfig::default();
        assert_eq!(config.pricing_policy(), PricingPolicy::default());
        assert_eq!(config.pending_ttl_secs, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discount_must_be_a_factor() {
        let mut config = BookingConfig::default();
        config.pricing.student_discount = dec!(1.2);
        assert_eq!(config.validate(), Err(ValidationError::InvalidDiscount));

        config.pricing.student_discount = Decimal::ZERO;
        assert_eq!(config.validate(), Err(ValidationError::InvalidDiscount));
    }

    #[test]
    fn test_negative_surcharge_rejected() {
        let mut config = BookingConfig::default();
        config.pricing.peak_surcharge = dec!(-1);
        assert_eq!(config.validate(), Err(ValidationError::InvalidSurcharge));
    }

    #[test]
    fn test_evening_threshold_format() {
        assert!(is_clock_time("18:00"));
        assert!(is_clock_time("00:59"));
        assert!(!is_clock_time("6pm"));
        assert!(!is_clock_time("24:00"));
        assert!(!is_clock_time("7:30"));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let config = BookingConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSweepSchedule));
    }
}
