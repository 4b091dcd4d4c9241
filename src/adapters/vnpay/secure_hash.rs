//! VNPay secure-hash canonicalisation.
//!
//! Parameters are sorted by key, empty values dropped, keys and values
//! percent-encoded with spaces as `+`, joined as `k=v&k=v`, then signed with
//! HMAC-SHA512. The same canonical string is the redirect query.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::collections::BTreeMap;

type HmacSha512 = Hmac<Sha512>;

pub const SECURE_HASH: &str = "vnp_SecureHash";
pub const SECURE_HASH_TYPE: &str = "vnp_SecureHashType";

/// Percent-encode the way VNPay's reference integrations do (`+` for space).
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

/// Canonical `key=value&...` string over non-empty values in key order.
pub fn canonical_query<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let sorted: BTreeMap<&str, &str> = params
        .into_iter()
        .filter(|(key, value)| !value.is_empty() && *key != SECURE_HASH && *key != SECURE_HASH_TYPE)
        .collect();

    sorted
        .into_iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Uppercase hex HMAC-SHA512 of `data`; `None` only for an unusable key.
pub fn sign(secret: &[u8], data: &str) -> Option<String> {
    let mut mac = HmacSha512::new_from_slice(secret).ok()?;
    mac.update(data.as_bytes());
    Some(hex::encode_upper(mac.finalize().into_bytes()))
}
