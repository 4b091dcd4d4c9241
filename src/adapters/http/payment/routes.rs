//! HTTP routes for payment attempts and provider callbacks.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    get_payment, momo_callback, momo_return, start_momo_payment, start_vnpay_payment, vnpay_ipn,
    vnpay_return,
};

/// Creates the payment router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payment/momo/create", post(start_momo_payment))
        .route("/payment/momo/callback", post(momo_callback))
        .route("/payment/momo/return", get(momo_return))
        .route("/payment/vnpay/create", post(start_vnpay_payment))
        .route("/payment/vnpay/ipn", get(vnpay_ipn))
        .route("/payment/vnpay/return", get(vnpay_return))
        .route("/payments/:id", get(get_payment))
}
