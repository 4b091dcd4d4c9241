//! Booking codes: the correlation key shared with payment providers.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

const PREFIX: &str = "BK";
const SUFFIX_LEN: usize = 7;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Human-readable booking reference, e.g. `BK-1718000000000-k3x9q2a`.
///
/// Uniqueness is enforced by the store; the random suffix only makes
/// collisions rare enough that a regenerate-and-retry loop suffices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingCode(String);

impl BookingCode {
    /// Generates a fresh code from the current time and the thread RNG.
    pub fn generate() -> Self {
        Self::generate_with(Timestamp::now(), &mut rand::thread_rng())
    }

    /// Generates a code for a given instant and random source.
    pub fn generate_with<R: Rng + ?Sized>(at: Timestamp, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{}-{}", PREFIX, at.as_unix_millis(), suffix))
    }

    /// Parses a code received from outside (callbacks, URLs).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::invalid_format("booking_code", "expected BK-<millis>-<suffix>");

        let mut parts = value.splitn(3, '-');
        let prefix = parts.next().ok_or_else(invalid)?;
        let millis = parts.next().ok_or_else(invalid)?;
        let suffix = parts.next().ok_or_else(invalid)?;

        if prefix != PREFIX
            || millis.is_empty()
            || !millis.bytes().all(|b| b.is_ascii_digit())
            || suffix.is_empty()
            || !suffix.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(invalid());
        }
        Ok(Self(value.to_string()))
    }

    /// Wraps a code read back from storage.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_code_has_prefix_millis_and_suffix() {
        let at = Timestamp::from_unix_millis(1_718_000_000_000);
        let code = BookingCode::generate_with(at, &mut StdRng::seed_from_u64(7));

        let parts: Vec<&str> = code.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "BK");
        assert_eq!(parts[1], "1718000000000");
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn same_seed_gives_same_code() {
        let at = Timestamp::from_unix_millis(1);
        let a = BookingCode::generate_with(at, &mut StdRng::seed_from_u64(42));
        let b = BookingCode::generate_with(at, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn generated_codes_parse() {
        let code = BookingCode::generate();
        assert_eq!(BookingCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn parse_rejects_foreign_formats() {
        assert!(BookingCode::parse("ORDER-1").is_err());
        assert!(BookingCode::parse("BK-abc-xyz1234").is_err());
        assert!(BookingCode::parse("BK-123-").is_err());
        assert!(BookingCode::parse("BK-123-ab cd").is_err());
    }
}
