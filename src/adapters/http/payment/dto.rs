//! HTTP DTOs for payment endpoints and provider acknowledgements.

use serde::{Deserialize, Serialize};

use crate::adapters::http::booking::dto::RedirectResponse;
use crate::domain::payment::{GatewayKind, Payment, PaymentStatus};

/// Body of `POST /payment/{gateway}/create`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPaymentRequest {
    pub booking_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: i64,
    pub booking_id: i64,
    pub order_id: String,
    pub request_id: Option<String>,
    pub amount: i64,
    pub provider: GatewayKind,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.value(),
            booking_id: payment.booking_id.value(),
            order_id: payment.order_id.clone(),
            request_id: payment.request_id.clone(),
            amount: payment.amount,
            provider: payment.provider,
            status: payment.status,
            transaction_id: payment.transaction_id.clone(),
            result_code: payment.result_code,
            message: payment.message.clone(),
            created_at: payment.created_at.as_datetime().to_rfc3339(),
            updated_at: payment.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response of `POST /payment/{gateway}/create`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPaymentResponse {
    pub payment: PaymentResponse,
    pub redirect: RedirectResponse,
}

// ════════════════════════════════════════════════════════════════════════════════
// Provider acknowledgements
// ════════════════════════════════════════════════════════════════════════════════

/// MoMo IPN acknowledgement: `0` processed, `1` rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoAck {
    pub result_code: i32,
    pub message: String,
}

impl MomoAck {
    pub fn processed() -> Self {
        Self {
            result_code: 0,
            message: "Success".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            result_code: 1,
            message: message.into(),
        }
    }
}

/// VNPay IPN acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VnpayAck {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl VnpayAck {
    pub fn new(rsp_code: &str, message: &str) -> Self {
        Self {
            rsp_code: rsp_code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn confirmed() -> Self {
        Self::new("00", "Confirm Success")
    }

    pub fn order_not_found() -> Self {
        Self::new("01", "Order not found")
    }

    pub fn already_confirmed() -> Self {
        Self::new("02", "Order already confirmed")
    }

    pub fn invalid_amount() -> Self {
        Self::new("04", "Invalid amount")
    }

    pub fn invalid_signature() -> Self {
        Self::new("97", "Invalid signature")
    }

    pub fn unknown_error() -> Self {
        Self::new("99", "Unknown error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vnpay_ack_uses_provider_field_names() {
        let value = serde_json::to_value(VnpayAck::invalid_signature()).unwrap();
        assert_eq!(value, json!({ "RspCode": "97", "Message": "Invalid signature" }));
    }

    #[test]
    fn momo_ack_uses_camel_case() {
        let value = serde_json::to_value(MomoAck::processed()).unwrap();
        assert_eq!(value["resultCode"], 0);
    }
}
