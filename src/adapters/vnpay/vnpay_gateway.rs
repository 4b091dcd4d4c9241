//! VNPay hosted-page gateway.
//!
//! Payment requests never leave the process: the adapter signs a query string
//! and hands back the hosted-page URL for the browser. IPN and browser return
//! carry the same signed parameter set.

use async_trait::async_trait;
use chrono::FixedOffset;
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use crate::config::VnpayConfig;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{CallbackParams, GatewayCallback, GatewayKind};
use crate::ports::{
    PaymentError, PaymentErrorCode, PaymentGateway, PaymentRedirect, PaymentRequest,
};

use super::secure_hash::{canonical_query, sign, SECURE_HASH};

/// VNPay expresses amounts in hundredths of a dong.
const AMOUNT_SCALE: i64 = 100;

/// VNPay timestamps are local time in Vietnam (GMT+7).
const VIETNAM_OFFSET_SECS: i32 = 7 * 3600;

const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// VNPay gateway adapter.
pub struct VnpayGateway {
    config: VnpayConfig,
}

impl VnpayGateway {
    pub fn new(config: VnpayConfig) -> Self {
        Self { config }
    }

    /// Build the signed hosted-page URL as of `now`.
    pub fn build_payment_url(
        &self,
        request: &PaymentRequest,
        now: Timestamp,
    ) -> Result<String, PaymentError> {
        if request.amount <= 0 {
            return Err(PaymentError::new(
                PaymentErrorCode::InvalidRequest,
                "Amount must be positive",
            ));
        }
        let scaled = request.amount.checked_mul(AMOUNT_SCALE).ok_or_else(|| {
            PaymentError::new(PaymentErrorCode::InvalidRequest, "Amount out of range")
        })?;

        let offset = FixedOffset::east_opt(VIETNAM_OFFSET_SECS).ok_or_else(|| {
            PaymentError::new(PaymentErrorCode::InvalidRequest, "Invalid timezone offset")
        })?;
        let create_date = now.at_offset(offset).format(DATE_FORMAT).to_string();
        let expire_date = now
            .plus_minutes(self.config.expire_minutes)
            .at_offset(offset)
            .format(DATE_FORMAT)
            .to_string();
        let amount = scaled.to_string();

        let params = [
            ("vnp_Version", self.config.version.as_str()),
            ("vnp_Command", "pay"),
            ("vnp_TmnCode", self.config.tmn_code.as_str()),
            ("vnp_Amount", amount.as_str()),
            ("vnp_CurrCode", "VND"),
            ("vnp_TxnRef", request.order_id.as_str()),
            ("vnp_OrderInfo", request.description.as_str()),
            ("vnp_OrderType", self.config.order_type.as_str()),
            ("vnp_Locale", self.config.locale.as_str()),
            ("vnp_ReturnUrl", request.callback_urls.return_url.as_str()),
            ("vnp_IpAddr", request.client_ip.as_str()),
            ("vnp_CreateDate", create_date.as_str()),
            ("vnp_ExpireDate", expire_date.as_str()),
        ];

        let query = canonical_query(params);
        let secure_hash = self.sign(&query)?;

        Ok(format!(
            "{}?{}&{}={}",
            self.config.url, query, SECURE_HASH, secure_hash
        ))
    }

    /// Secure hash VNPay would attach to `params`.
    pub fn secure_hash(&self, params: &CallbackParams) -> Result<String, PaymentError> {
        self.sign(&canonical_query(params.iter()))
    }

    fn sign(&self, data: &str) -> Result<String, PaymentError> {
        sign(self.config.hash_secret.expose_secret().as_bytes(), data)
            .ok_or_else(|| PaymentError::new(PaymentErrorCode::InvalidRequest, "Invalid signing key"))
    }
}

/// Human-readable meaning of a `vnp_ResponseCode`.
pub fn describe_response_code(code: &str) -> &'static str {
    match code {
        "00" => "Transaction successful",
        "07" => "Amount debited, transaction flagged as suspicious",
        "09" => "Card or account not registered for internet banking",
        "10" => "Card or account verification failed too many times",
        "11" => "Payment window expired",
        "12" => "Card or account is locked",
        "13" => "Incorrect one-time password",
        "24" => "Customer cancelled the transaction",
        "51" => "Insufficient balance",
        "65" => "Daily transaction limit exceeded",
        "75" => "Issuing bank under maintenance",
        "79" => "Payment password entered incorrectly too many times",
        _ => "Transaction failed",
    }
}

fn required<'a>(params: &'a CallbackParams, field: &str) -> Result<&'a str, PaymentError> {
    match params.get(field) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(PaymentError::invalid_callback(format!("Missing field {}", field))),
    }
}

#[async_trait]
impl PaymentGateway for VnpayGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Vnpay
    }

    async fn create_payment_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError> {
        let redirect_url = self.build_payment_url(request, Timestamp::now())?;
        tracing::info!(order_id = %request.order_id, "VNPay payment URL built");

        Ok(PaymentRedirect {
            redirect_url,
            provider_request_id: None,
            qr_code_url: None,
            deeplink: None,
        })
    }

    fn verify_callback_signature(&self, params: &CallbackParams) -> bool {
        let Some(provided) = params.get(SECURE_HASH) else {
            return false;
        };
        let Ok(expected) = self.secure_hash(params) else {
            return false;
        };
        let provided = provided.to_ascii_uppercase();
        expected.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() == 1
    }

    fn parse_callback(&self, params: &CallbackParams) -> Result<GatewayCallback, PaymentError> {
        if !self.verify_callback_signature(params) {
            tracing::warn!(
                txn_ref = params.get_or_empty("vnp_TxnRef"),
                "Invalid VNPay secure hash"
            );
            return Err(PaymentError::invalid_signature());
        }

        let order_id = required(params, "vnp_TxnRef")?.to_string();
        let scaled = required(params, "vnp_Amount")?
            .parse::<i64>()
            .map_err(|_| PaymentError::invalid_callback("vnp_Amount is not an integer"))?;
        if scaled % AMOUNT_SCALE != 0 {
            return Err(PaymentError::invalid_callback(
                "vnp_Amount is not a whole currency amount",
            ));
        }
        let response_code = required(params, "vnp_ResponseCode")?;
        let result_code = response_code
            .parse::<i32>()
            .map_err(|_| PaymentError::invalid_callback("vnp_ResponseCode is not numeric"))?;
        let transaction_status = params.get_or_empty("vnp_TransactionStatus");
        let transaction_id = params
            .get("vnp_TransactionNo")
            .filter(|id| !id.is_empty() && *id != "0")
            .map(str::to_string);

        Ok(GatewayCallback {
            gateway: GatewayKind::Vnpay,
            order_id,
            transaction_id,
            amount: scaled / AMOUNT_SCALE,
            result_code,
            message: describe_response_code(response_code).to_string(),
            succeeded: response_code == "00" && transaction_status == "00",
            signature: params.get_or_empty(SECURE_HASH).to_string(),
        })
    }
}
