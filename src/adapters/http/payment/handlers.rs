//! HTTP handlers for payment attempts and provider callbacks.
//!
//! Server-to-server notifications answer in the provider's acknowledgement
//! format; browser returns always redirect to the confirmation page. Either
//! entry point sends the confirmation e-mail when it is the one that
//! confirmed the booking.

use std::collections::HashMap;

use axum::extract::{Json, Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use crate::adapters::http::booking::dto::RedirectResponse;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::extract::ClientIp;
use crate::adapters::http::state::AppState;
use crate::application::handlers::{
    GetPaymentQuery, PaymentReturnCommand, ReconcilePaymentCommand, ReconcilePaymentResult,
    StartPaymentCommand,
};
use crate::domain::booking::BookingError;
use crate::domain::foundation::{BookingId, PaymentId};
use crate::domain::payment::{CallbackParams, GatewayKind};

use super::dto::{MomoAck, PaymentResponse, StartPaymentRequest, StartPaymentResponse, VnpayAck};

// ════════════════════════════════════════════════════════════════════════════════
// Payment attempts
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payment/momo/create
pub async fn start_momo_payment(
    state: State<AppState>,
    client_ip: ClientIp,
    request: Json<StartPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    start_payment(state, GatewayKind::Momo, client_ip, request).await
}

/// POST /payment/vnpay/create
pub async fn start_vnpay_payment(
    state: State<AppState>,
    client_ip: ClientIp,
    request: Json<StartPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    start_payment(state, GatewayKind::Vnpay, client_ip, request).await
}

async fn start_payment(
    State(state): State<AppState>,
    gateway: GatewayKind,
    ClientIp(client_ip): ClientIp,
    Json(request): Json<StartPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = StartPaymentCommand {
        gateway,
        booking_id: BookingId::new(request.booking_id).map_err(BookingError::from)?,
        client_ip,
    };
    let result = state.start_payment_handler().handle(command).await?;

    let response = StartPaymentResponse {
        payment: PaymentResponse::from(&result.payment),
        redirect: RedirectResponse::from(&result.redirect),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /payments/{id}
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetPaymentQuery {
        payment_id: PaymentId::new(id).map_err(BookingError::from)?,
    };
    let payment = state.get_payment_handler().handle(query).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

// ════════════════════════════════════════════════════════════════════════════════
// MoMo
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payment/momo/callback - JSON IPN
pub async fn momo_callback(State(state): State<AppState>, Json(body): Json<Value>) -> Json<MomoAck> {
    let command = ReconcilePaymentCommand {
        gateway: GatewayKind::Momo,
        params: CallbackParams::from_json(&body),
    };

    match state.reconcile_handler().handle(command).await {
        Ok(result) => {
            log_reconciled(&result);
            state.confirmation_mailer().on_reconciled(&result).await;
            Json(MomoAck::processed())
        }
        Err(err) => {
            tracing::warn!(gateway = "momo", error = %err, "IPN rejected");
            Json(MomoAck::rejected(err.message()))
        }
    }
}

/// GET /payment/momo/return - browser return
pub async fn momo_return(
    state: State<AppState>,
    query: Query<HashMap<String, String>>,
) -> impl IntoResponse {
    browser_return(state, GatewayKind::Momo, query).await
}

// ════════════════════════════════════════════════════════════════════════════════
// VNPay
// ════════════════════════════════════════════════════════════════════════════════

/// GET /payment/vnpay/ipn - server-to-server notification
pub async fn vnpay_ipn(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<VnpayAck> {
    let command = ReconcilePaymentCommand {
        gateway: GatewayKind::Vnpay,
        params: query.into_iter().collect(),
    };
    let outcome = state.reconcile_handler().handle(command).await;
    match &outcome {
        Ok(result) => {
            state.confirmation_mailer().on_reconciled(result).await;
        }
        Err(err) => tracing::warn!(gateway = "vnpay", error = %err, "IPN rejected"),
    }
    Json(vnpay_ack(outcome))
}

/// GET /payment/vnpay/return - browser return
pub async fn vnpay_return(
    state: State<AppState>,
    query: Query<HashMap<String, String>>,
) -> impl IntoResponse {
    browser_return(state, GatewayKind::Vnpay, query).await
}

fn vnpay_ack(outcome: Result<ReconcilePaymentResult, BookingError>) -> VnpayAck {
    match outcome {
        Ok(result) if result.is_replay() => VnpayAck::already_confirmed(),
        Ok(result) => {
            log_reconciled(&result);
            VnpayAck::confirmed()
        }
        Err(BookingError::PaymentNotFound(_)) => VnpayAck::order_not_found(),
        Err(BookingError::AmountMismatch { .. }) => VnpayAck::invalid_amount(),
        Err(BookingError::InvalidSignature { .. }) => VnpayAck::invalid_signature(),
        Err(_) => VnpayAck::unknown_error(),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Shared
// ════════════════════════════════════════════════════════════════════════════════

async fn browser_return(
    State(state): State<AppState>,
    gateway: GatewayKind,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let result = state
        .payment_return_handler()
        .handle(PaymentReturnCommand {
            gateway,
            params: query.into_iter().collect(),
        })
        .await;

    tracing::info!(gateway = %gateway, status = result.status.as_str(), "Payment return");
    // Plain 302; Redirect::to would send 303.
    (StatusCode::FOUND, [(LOCATION, result.redirect_url)])
}

fn log_reconciled(result: &ReconcilePaymentResult) {
    tracing::info!(
        gateway = %result.callback.gateway,
        order_id = %result.callback.order_id,
        payment_status = result.payment.status.as_str(),
        booking_status = result.booking.status.as_str(),
        replay = result.is_replay(),
        "Payment callback reconciled"
    );
}
