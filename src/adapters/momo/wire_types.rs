//! MoMo API wire types.

use serde::{Deserialize, Serialize};

/// Body of `POST /v2/gateway/api/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoCreateRequest {
    pub partner_code: String,
    pub partner_name: String,
    pub store_id: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub lang: String,
    pub request_type: String,
    pub auto_capture: bool,
    pub extra_data: String,
    pub order_group_id: String,
    pub signature: String,
}

/// Response of the create endpoint. Only `resultCode == 0` carries a `payUrl`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoCreateResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    pub result_code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub deeplink: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

/// Field order of the create-request signature.
pub const CREATE_SIGNATURE_FIELDS: [&str; 10] = [
    "accessKey",
    "amount",
    "extraData",
    "ipnUrl",
    "orderId",
    "orderInfo",
    "partnerCode",
    "redirectUrl",
    "requestId",
    "requestType",
];

/// Field order of the IPN / return signature.
pub const CALLBACK_SIGNATURE_FIELDS: [&str; 13] = [
    "accessKey",
    "amount",
    "extraData",
    "message",
    "orderId",
    "orderInfo",
    "orderType",
    "partnerCode",
    "payType",
    "requestId",
    "responseTime",
    "resultCode",
    "transId",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_camel_case() {
        let request = MomoCreateRequest {
            partner_code: "MOMO".to_string(),
            partner_name: "Cinema".to_string(),
            store_id: "CinemaStore".to_string(),
            request_id: "req-1".to_string(),
            amount: 50_000,
            order_id: "BK-1-abc".to_string(),
            order_info: "Booking BK-1-abc".to_string(),
            redirect_url: "http://localhost/return".to_string(),
            ipn_url: "http://localhost/ipn".to_string(),
            lang: "vi".to_string(),
            request_type: "captureWallet".to_string(),
            auto_capture: true,
            extra_data: "42".to_string(),
            order_group_id: String::new(),
            signature: "sig".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["partnerCode"], "MOMO");
        assert_eq!(json["ipnUrl"], "http://localhost/ipn");
        assert_eq!(json["autoCapture"], true);
        assert_eq!(json["orderGroupId"], "");
    }

    #[test]
    fn error_response_parses_without_pay_url() {
        let json = r#"{"partnerCode":"MOMO","orderId":"BK-1","requestId":"r","amount":500,
            "responseTime":1700000000000,"message":"Invalid amount","resultCode":22}"#;
        let response: MomoCreateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result_code, 22);
        assert!(response.pay_url.is_none());
    }

    #[test]
    fn signature_field_orders_are_alphabetical_by_name() {
        let mut sorted = CALLBACK_SIGNATURE_FIELDS;
        sorted.sort_unstable();
        assert_eq!(sorted, CALLBACK_SIGNATURE_FIELDS);
    }
}
