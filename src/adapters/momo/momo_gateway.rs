//! MoMo wallet-redirect gateway.
//!
//! Outbound requests are signed with HMAC-SHA256 over a fixed, provider
//! dictated field order and submitted to MoMo's create endpoint, which answers
//! with a `payUrl` (plus optional QR and deeplink). Callbacks (IPN and browser
//! return share one scheme) are signed over a different fixed field set.
//!
//! # Security
//!
//! - Constant-time signature comparison
//! - Secret key held in `secrecy::SecretString` and never logged

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

use crate::config::MomoConfig;
use crate::domain::payment::{CallbackParams, GatewayCallback, GatewayKind};
use crate::ports::{
    PaymentError, PaymentErrorCode, PaymentGateway, PaymentRedirect, PaymentRequest,
};

use super::wire_types::{
    MomoCreateRequest, MomoCreateResponse, CALLBACK_SIGNATURE_FIELDS, CREATE_SIGNATURE_FIELDS,
};

type HmacSha256 = Hmac<Sha256>;

/// MoMo gateway adapter.
pub struct MomoGateway {
    config: MomoConfig,
    http_client: reqwest::Client,
}

impl MomoGateway {
    /// Create the adapter with a bounded outbound timeout.
    pub fn new(config: MomoConfig, timeout: Duration) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build the signed create-request body.
    pub fn build_create_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<MomoCreateRequest, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::new(
                PaymentErrorCode::InvalidRequest,
                "Amount must be positive",
            ));
        }

        let ipn_url = request
            .callback_urls
            .notify_url
            .clone()
            .unwrap_or_else(|| self.config.ipn_url.clone());
        let amount = request.amount.to_string();

        let values = [
            self.config.access_key.as_str(),
            amount.as_str(),
            request.extra_data.as_str(),
            ipn_url.as_str(),
            request.order_id.as_str(),
            request.description.as_str(),
            self.config.partner_code.as_str(),
            request.callback_urls.return_url.as_str(),
            request.request_id.as_str(),
            self.config.request_type.as_str(),
        ];
        let raw = join_fields(CREATE_SIGNATURE_FIELDS.iter().copied().zip(values));
        let signature = self.sign(&raw)?;

        Ok(MomoCreateRequest {
            partner_code: self.config.partner_code.clone(),
            partner_name: self.config.partner_name.clone(),
            store_id: self.config.store_id.clone(),
            request_id: request.request_id.clone(),
            amount: request.amount,
            order_id: request.order_id.clone(),
            order_info: request.description.clone(),
            redirect_url: request.callback_urls.return_url.clone(),
            ipn_url,
            lang: self.config.lang.clone(),
            request_type: self.config.request_type.clone(),
            auto_capture: true,
            extra_data: request.extra_data.clone(),
            order_group_id: String::new(),
            signature,
        })
    }

    /// Signature MoMo would attach to a callback carrying `params`.
    ///
    /// `accessKey` comes from configuration; every other field from the callback,
    /// missing ones as empty strings.
    pub fn callback_signature(&self, params: &CallbackParams) -> Result<String, PaymentError> {
        let raw = join_fields(CALLBACK_SIGNATURE_FIELDS.iter().map(|&field| {
            let value = if field == "accessKey" {
                self.config.access_key.as_str()
            } else {
                params.get_or_empty(field)
            };
            (field, value)
        }));
        self.sign(&raw)
    }

    fn sign(&self, raw: &str) -> Result<String, PaymentError> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret_key.expose_secret().as_bytes())
            .map_err(|_| PaymentError::new(PaymentErrorCode::InvalidRequest, "Invalid signing key"))?;
        mac.update(raw.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

fn join_fields<'k, 'v>(fields: impl IntoIterator<Item = (&'k str, &'v str)>) -> String {
    fields
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn required<'a>(params: &'a CallbackParams, field: &str) -> Result<&'a str, PaymentError> {
    match params.get(field) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PaymentError::invalid_callback(format!("Missing field {}", field))),
    }
}

#[async_trait]
impl PaymentGateway for MomoGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Momo
    }

    async fn create_payment_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError> {
        let body = self.build_create_request(request)?;

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PaymentError::timeout("MoMo did not respond in time")
                } else {
                    PaymentError::network(e.to_string())
                }
            })?;

        let status = response.status();
        let parsed: MomoCreateResponse = response.json().await.map_err(|e| {
            tracing::error!(http_status = %status, error = %e, "Unreadable MoMo response");
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse MoMo response: {}", e),
            )
        })?;

        if parsed.result_code != 0 {
            tracing::warn!(
                order_id = %request.order_id,
                result_code = parsed.result_code,
                message = %parsed.message,
                "MoMo rejected payment request"
            );
            return Err(PaymentError::rejected(parsed.message)
                .with_provider_code(parsed.result_code.to_string()));
        }

        let redirect_url = parsed.pay_url.ok_or_else(|| {
            PaymentError::new(PaymentErrorCode::ProviderError, "MoMo response has no payUrl")
        })?;

        tracing::info!(order_id = %request.order_id, "MoMo payment request created");

        Ok(PaymentRedirect {
            redirect_url,
            provider_request_id: parsed.request_id.or_else(|| Some(request.request_id.clone())),
            qr_code_url: parsed.qr_code_url.filter(|s| !s.is_empty()),
            deeplink: parsed.deeplink.filter(|s| !s.is_empty()),
        })
    }

    fn verify_callback_signature(&self, params: &CallbackParams) -> bool {
        let Some(provided) = params.get("signature") else {
            return false;
        };
        let Ok(expected) = self.callback_signature(params) else {
            return false;
        };
        let provided = provided.to_ascii_lowercase();
        expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() == 1
    }

    fn parse_callback(&self, params: &CallbackParams) -> Result<GatewayCallback, PaymentError> {
        if !self.verify_callback_signature(params) {
            tracing::warn!(
                order_id = params.get_or_empty("orderId"),
                "Invalid MoMo callback signature"
            );
            return Err(PaymentError::invalid_signature());
        }

        let order_id = required(params, "orderId")?.to_string();
        let amount = required(params, "amount")?
            .parse::<i64>()
            .map_err(|_| PaymentError::invalid_callback("amount is not an integer"))?;
        let result_code = required(params, "resultCode")?
            .parse::<i32>()
            .map_err(|_| PaymentError::invalid_callback("resultCode is not an integer"))?;
        let transaction_id = params
            .get("transId")
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(GatewayCallback {
            gateway: GatewayKind::Momo,
            order_id,
            transaction_id,
            amount,
            result_code,
            message: params.get_or_empty("message").to_string(),
            succeeded: result_code == 0,
            signature: params.get_or_empty("signature").to_string(),
        })
    }
}
