//! Provider-neutral callback payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::booking::PaymentMethod;

/// The payment providers the core integrates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Wallet redirect (MoMo).
    Momo,
    /// Hosted payment page (VNPay).
    Vnpay,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Momo => "momo",
            GatewayKind::Vnpay => "vnpay",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "momo" => Some(GatewayKind::Momo),
            "vnpay" => Some(GatewayKind::Vnpay),
            _ => None,
        }
    }

    /// The booking payment method recorded when this gateway settles.
    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            GatewayKind::Momo => PaymentMethod::Momo,
            GatewayKind::Vnpay => PaymentMethod::Vnpay,
        }
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat key/value view of a callback, whether it arrived as JSON or a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackParams(BTreeMap<String, String>);

impl CallbackParams {
    pub fn new(params: BTreeMap<String, String>) -> Self {
        Self(params)
    }

    /// Flattens a JSON object. Numbers and booleans keep their JSON text,
    /// nulls become empty strings, nested values are skipped.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut params = BTreeMap::new();
        if let serde_json::Value::Object(map) = value {
            for (key, value) in map {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Null => String::new(),
                    _ => continue,
                };
                params.insert(key.clone(), text);
            }
        }
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A callback that passed signature verification, normalised across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCallback {
    pub gateway: GatewayKind,
    /// Our order reference (the booking code).
    pub order_id: String,
    /// Provider transaction id, when the provider assigned one.
    pub transaction_id: Option<String>,
    /// Amount in whole currency units.
    pub amount: i64,
    pub result_code: i32,
    pub message: String,
    pub succeeded: bool,
    pub signature: String,
}
