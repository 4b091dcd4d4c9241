//! Resend e-mail notifier.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::config::EmailConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{BookingConfirmation, BookingNotifier};

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

/// Sends booking confirmations through the Resend HTTP API.
pub struct ResendNotifier {
    api_key: SecretString,
    api_url: String,
    from: String,
    http_client: reqwest::Client,
}

impl ResendNotifier {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Option<Self>, DomainError> {
        let Some(api_key) = config.resend_api_key.clone() else {
            return Ok(None);
        };
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        Ok(Some(Self {
            api_key,
            api_url: config.api_url.clone(),
            from: config.from_header(),
            http_client,
        }))
    }
}

/// Subject line for a confirmation.
pub fn confirmation_subject(confirmation: &BookingConfirmation) -> String {
    format!("Your tickets: booking {}", confirmation.booking_code)
}

/// Minimal HTML body for a confirmation.
pub fn confirmation_html(confirmation: &BookingConfirmation) -> String {
    let greeting = confirmation
        .customer_name
        .as_deref()
        .map(|name| format!("Hi {},", escape(name)))
        .unwrap_or_else(|| "Hi,".to_string());
    let method = confirmation
        .payment_method
        .as_deref()
        .map(|m| format!("<li>Paid with: {}</li>", escape(m)))
        .unwrap_or_default();

    format!(
        "<p>{}</p>\
         <p>Your booking <strong>{}</strong> is confirmed.</p>\
         <ul>\
         <li>Date: {}</li>\
         <li>Time: {}</li>\
         <li>Seats: {}</li>\
         <li>Total: {} VND</li>\
         {}\
         </ul>",
        greeting,
        escape(&confirmation.booking_code),
        escape(&confirmation.showtime_date),
        escape(&confirmation.showtime_time),
        escape(&confirmation.seats.join(", ")),
        confirmation.total_price.round_dp(0),
        method,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl BookingNotifier for ResendNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), DomainError> {
        let body = ResendEmail {
            from: &self.from,
            to: [recipient],
            subject: confirmation_subject(confirmation),
            html: confirmation_html(confirmation),
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(http_status = %status, error = %error_text, "Resend rejected e-mail");
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("E-mail provider returned {}", status),
            ));
        }

        tracing::info!(
            booking_code = %confirmation.booking_code,
            "Booking confirmation e-mail sent"
        );
        Ok(())
    }
}
