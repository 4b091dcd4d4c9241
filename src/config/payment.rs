//! Payment gateway configuration (MoMo, VNPay)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration shared by every gateway plus per-gateway sections.
///
/// A gateway whose section is absent is simply not offered; requests naming
/// it fail with `GATEWAY_NOT_CONFIGURED`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Outbound gateway request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Smallest amount (VND) any gateway accepts
    #[serde(default = "default_minimum_amount")]
    pub minimum_amount: i64,

    /// MoMo wallet (gateway A)
    pub momo: Option<MomoConfig>,

    /// VNPay (gateway B)
    pub vnpay: Option<VnpayConfig>,
}

/// MoMo merchant credentials and endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: SecretString,

    /// Create-payment endpoint
    #[serde(default = "default_momo_endpoint")]
    pub endpoint: String,

    /// Where MoMo sends the customer back
    pub redirect_url: String,

    /// Server-to-server notification URL
    pub ipn_url: String,

    #[serde(default = "default_momo_partner_name")]
    pub partner_name: String,

    #[serde(default = "default_momo_store_id")]
    pub store_id: String,

    #[serde(default = "default_momo_request_type")]
    pub request_type: String,

    #[serde(default = "default_momo_lang")]
    pub lang: String,
}

/// VNPay merchant credentials and endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct VnpayConfig {
    pub tmn_code: String,
    pub hash_secret: SecretString,

    /// Hosted payment page
    #[serde(default = "default_vnpay_url")]
    pub url: String,

    /// Where VNPay sends the customer back
    pub return_url: String,

    /// IPN URL registered in the merchant portal; informational only
    pub ipn_url: Option<String>,

    #[serde(default = "default_vnpay_version")]
    pub version: String,

    #[serde(default = "default_vnpay_locale")]
    pub locale: String,

    #[serde(default = "default_vnpay_order_type")]
    pub order_type: String,

    /// Minutes until the hosted page stops accepting the payment
    #[serde(default = "default_vnpay_expire_minutes")]
    pub expire_minutes: i64,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.minimum_amount <= 0 {
            return Err(ValidationError::InvalidMinimumAmount);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(momo) = &self.momo {
            momo.validate(production)?;
        }
        if let Some(vnpay) = &self.vnpay {
            vnpay.validate(production)?;
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            minimum_amount: default_minimum_amount(),
            momo: None,
            vnpay: None,
        }
    }
}

impl MomoConfig {
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.partner_code.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MOMO__PARTNER_CODE"));
        }
        if self.access_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MOMO__ACCESS_KEY"));
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MOMO__SECRET_KEY"));
        }
        check_url("PAYMENT__MOMO__ENDPOINT", &self.endpoint, production)?;
        check_url("PAYMENT__MOMO__REDIRECT_URL", &self.redirect_url, false)?;
        check_url("PAYMENT__MOMO__IPN_URL", &self.ipn_url, production)?;
        Ok(())
    }
}

impl VnpayConfig {
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.tmn_code.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__VNPAY__TMN_CODE"));
        }
        if self.hash_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__VNPAY__HASH_SECRET"));
        }
        check_url("PAYMENT__VNPAY__URL", &self.url, production)?;
        check_url("PAYMENT__VNPAY__RETURN_URL", &self.return_url, false)?;
        if self.expire_minutes <= 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn check_url(name: &'static str, url: &str, require_https: bool) -> Result<(), ValidationError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidUrl(name));
    }
    if require_https && !url.starts_with("https://") {
        return Err(ValidationError::UrlMustBeHttps(name));
    }
    Ok(())
}

fn default_request_timeout() -> u64 {
    30
}

fn default_minimum_amount() -> i64 {
    1_000
}

fn default_momo_endpoint() -> String {
    "https://test-payment.momo.vn/v2/gateway/api/create".to_string()
}

fn default_momo_partner_name() -> String {
    "Cinema".to_string()
}

fn default_momo_store_id() -> String {
    "CinemaStore".to_string()
}

fn default_momo_request_type() -> String {
    "captureWallet".to_string()
}

fn default_momo_lang() -> String {
    "vi".to_string()
}

fn default_vnpay_url() -> String {
    "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string()
}

fn default_vnpay_version() -> String {
    "2.1.0".to_string()
}

fn default_vnpay_locale() -> String {
    "vn".to_string()
}

fn default_vnpay_order_type() -> String {
    "other".to_string()
}

fn default_vnpay_expire_minutes() -> i64 {
    15
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn momo() -> MomoConfig {
        MomoConfig {
            partner_code: "MOMOTEST".to_string(),
            access_key: "F8BBA842ECF85".to_string(),
            secret_key: SecretString::new("K951B6PE1waDMi640xX08PD3vg6EkVlz".to_string()),
            endpoint: default_momo_endpoint(),
            redirect_url: "http://localhost:8080/payment/momo/return".to_string(),
            ipn_url: "https://cinema.example.com/payment/momo/callback".to_string(),
            partner_name: default_momo_partner_name(),
            store_id: default_momo_store_id(),
            request_type: default_momo_request_type(),
            lang: default_momo_lang(),
        }
    }

    pub fn vnpay() -> VnpayConfig {
        VnpayConfig {
            tmn_code: "CINEMA01".to_string(),
            hash_secret: SecretString::new("SECRETKEYFORTESTS".to_string()),
            url: default_vnpay_url(),
            return_url: "http://localhost:8080/payment/vnpay/return".to_string(),
            ipn_url: None,
            version: default_vnpay_version(),
            locale: default_vnpay_locale(),
            order_type: default_vnpay_order_type(),
            expire_minutes: default_vnpay_expire_minutes(),
        }
    }
}
