//! Email configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Resend). Without an API key confirmations are only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: Option<SecretString>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = &self.resend_api_key {
            if !key.expose_secret().starts_with("re_") {
                return Err(ValidationError::InvalidResendKey);
            }
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            api_url: default_api_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_from_email() -> String {
    "tickets@cinema.example.com".to_string()
}

fn default_from_name() -> String {
    "Cinema Tickets".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        let config = EmailConfig::default();
        assert_eq!(config.from_header(), "Cinema Tickets <tickets@cinema.example.com>");
    }

    #[test]
    fn test_disabled_without_key() {
        let config = EmailConfig::default();
        assert!(config.resend_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_key_prefix() {
        let config = EmailConfig {
            resend_api_key: Some(SecretString::new("sk_xxx".to_string())),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidResendKey));
    }

    #[test]
    fn test_validation_invalid_from_email() {
        let config = EmailConfig {
            from_email: "invalid-email".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFromEmail));
    }
}
