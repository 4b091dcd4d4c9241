//! PaymentReturnHandler - Browser return from a payment provider.
//!
//! Reconciles exactly like the server-to-server notification, then builds
//! the redirect to the frontend confirmation page. When this return is the
//! settlement that confirmed the booking, the confirmation e-mail is
//! dispatched in the background; a reload of the return page sends nothing.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::booking::BookingError;
use crate::domain::payment::{CallbackParams, GatewayKind, PaymentStatus};
use crate::ports::{BookingNotifier, CatalogReader};

use super::confirmation::{confirmed_by, ConfirmationMailer};
use super::reconcile_payment::{ReconcilePaymentCommand, ReconcilePaymentHandler};

/// Status shown on the confirmation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStatus {
    Success,
    Failed,
    /// The return could not be authenticated.
    Invalid,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Success => "success",
            ReturnStatus::Failed => "failed",
            ReturnStatus::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentReturnCommand {
    pub gateway: GatewayKind,
    pub params: CallbackParams,
}

#[derive(Debug)]
pub struct PaymentReturnResult {
    pub status: ReturnStatus,
    /// Where to send the browser.
    pub redirect_url: String,
    /// Background e-mail dispatch, when one was started.
    pub notification: Option<JoinHandle<()>>,
}

pub struct PaymentReturnHandler {
    reconcile: Arc<ReconcilePaymentHandler>,
    mailer: ConfirmationMailer,
    confirmation_url: String,
}

impl PaymentReturnHandler {
    pub fn new(
        reconcile: Arc<ReconcilePaymentHandler>,
        catalog: Arc<dyn CatalogReader>,
        notifier: Arc<dyn BookingNotifier>,
        confirmation_url: impl Into<String>,
    ) -> Self {
        Self {
            reconcile,
            mailer: ConfirmationMailer::new(catalog, notifier),
            confirmation_url: confirmation_url.into(),
        }
    }

    /// Never fails: every outcome becomes a redirect.
    pub async fn handle(&self, cmd: PaymentReturnCommand) -> PaymentReturnResult {
        let gateway = cmd.gateway;
        let reconciled = self
            .reconcile
            .handle(ReconcilePaymentCommand {
                gateway,
                params: cmd.params,
            })
            .await;

        let result = match reconciled {
            Ok(result) => result,
            Err(err) => {
                let status = match err {
                    BookingError::InvalidSignature { .. } => ReturnStatus::Invalid,
                    _ => ReturnStatus::Failed,
                };
                tracing::warn!(gateway = %gateway, error = %err, "Payment return not reconciled");
                return PaymentReturnResult {
                    status,
                    redirect_url: self.redirect_url(status, &[]),
                    notification: None,
                };
            }
        };

        let status = if result.payment.status == PaymentStatus::Success {
            ReturnStatus::Success
        } else {
            ReturnStatus::Failed
        };

        let details = self.mailer.details(&result.booking).await;
        let redirect_url = self.redirect_url(status, &details.query(&result.booking));

        let notification = if confirmed_by(&result.settlement) {
            self.mailer.dispatch(&result.booking, &details)
        } else {
            None
        };

        PaymentReturnResult {
            status,
            redirect_url,
            notification,
        }
    }

    fn redirect_url(&self, status: ReturnStatus, details: &[(&str, String)]) -> String {
        let mut query = format!("status={}", status.as_str());
        for (key, value) in details {
            query.push('&');
            query.push_str(key);
            query.push('=');
            query.push_str(&urlencoding::encode(value));
        }
        let separator = if self.confirmation_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.confirmation_url, separator, query)
    }
}
