//! Payment gateway port.
//!
//! One trait, one implementation per provider. Each adapter knows how to
//! build a signed payment request and how to authenticate the provider's
//! callbacks; nothing outside the adapter sees provider field names.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::{CallbackParams, GatewayCallback, GatewayKind};

/// Where the provider should send the user and its server-to-server notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackUrls {
    /// Browser return URL.
    pub return_url: String,
    /// Server-to-server notification URL, for providers that take one per request.
    pub notify_url: Option<String>,
}

/// Provider-neutral payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Our order reference (the booking code).
    pub order_id: String,
    /// Per-attempt id, unique across retries of the same order.
    pub request_id: String,
    /// Whole currency units.
    pub amount: i64,
    pub description: String,
    pub callback_urls: CallbackUrls,
    /// Opaque value echoed back in callbacks.
    pub extra_data: String,
    /// Address of the paying customer, required by some providers.
    pub client_ip: String,
}

/// What the client needs to complete payment at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRedirect {
    pub redirect_url: String,
    /// Provider-side correlation id for this request, if any.
    pub provider_request_id: Option<String>,
    pub qr_code_url: Option<String>,
    pub deeplink: Option<String>,
}

/// Payment gateway adapter contract.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn kind(&self) -> GatewayKind;

    /// Build (and, for API-based providers, submit) a signed payment request.
    ///
    /// Implementations bound the outbound call with a timeout.
    async fn create_payment_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError>;

    /// Recompute the provider signature over `params` and compare it with the one supplied.
    fn verify_callback_signature(&self, params: &CallbackParams) -> bool;

    /// Verify and normalise a callback.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if authentication fails
    /// - `InvalidCallback` if required fields are missing or malformed
    fn parse_callback(&self, params: &CallbackParams) -> Result<GatewayCallback, PaymentError>;
}

/// Configured gateways together with their callback URLs.
#[derive(Clone, Default)]
pub struct PaymentGateways {
    entries: HashMap<GatewayKind, (Arc<dyn PaymentGateway>, CallbackUrls)>,
}

impl PaymentGateways {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gateway: Arc<dyn PaymentGateway>, callback_urls: CallbackUrls) -> Self {
        self.entries.insert(gateway.kind(), (gateway, callback_urls));
        self
    }

    pub fn get(&self, kind: GatewayKind) -> Option<(&Arc<dyn PaymentGateway>, &CallbackUrls)> {
        self.entries.get(&kind).map(|(gateway, urls)| (gateway, urls))
    }

    pub fn is_configured(&self, kind: GatewayKind) -> bool {
        self.entries.contains_key(&kind)
    }
}

/// Errors from payment gateway operations.
///
/// Messages must never contain secrets or computed signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Provider's own result code, if it returned one.
    pub provider_code: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderRejected, message)
    }

    pub fn invalid_signature() -> Self {
        Self::new(PaymentErrorCode::InvalidSignature, "Callback signature mismatch")
    }

    pub fn invalid_callback(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidCallback, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::InvalidSignature => ErrorCode::InvalidSignature,
            PaymentErrorCode::InvalidRequest | PaymentErrorCode::InvalidCallback => {
                ErrorCode::ValidationFailed
            }
            _ => ErrorCode::GatewayError,
        };
        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Could not reach the provider.
    NetworkError,

    /// Provider did not answer within the configured bound.
    Timeout,

    /// Request could not be built (bad amount, missing field).
    InvalidRequest,

    /// Provider answered with a non-success result code.
    ProviderRejected,

    /// Callback signature did not verify.
    InvalidSignature,

    /// Callback was authentic but unusable.
    InvalidCallback,

    /// Unexpected provider response.
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentErrorCode::NetworkError | PaymentErrorCode::Timeout)
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::ProviderRejected => "provider_rejected",
            PaymentErrorCode::InvalidSignature => "invalid_signature",
            PaymentErrorCode::InvalidCallback => "invalid_callback",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
