//! HTTP-level tests of the booking API with the VNPay adapter wired in.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cinema_booking::adapters::http::api_router;
use cinema_booking::adapters::VnpayGateway;
use cinema_booking::domain::payment::CallbackParams;
use cinema_booking::ports::{CallbackUrls, PaymentGateways};

use common::*;

fn app() -> (Router, Arc<VnpayGateway>) {
    let (router, vnpay, _) = app_with_notifier();
    (router, vnpay)
}

fn app_with_notifier() -> (Router, Arc<VnpayGateway>, Arc<RecordingNotifier>) {
    let vnpay = Arc::new(VnpayGateway::new(vnpay_config()));
    let gateways = PaymentGateways::new().with(
        vnpay.clone(),
        CallbackUrls {
            return_url: "http://localhost:8080/payment/vnpay/return".to_string(),
            notify_url: None,
        },
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let mut state = app_state(seeded_store(), gateways);
    state.notifier = notifier.clone();
    (api_router().with_state(state), vnpay, notifier)
}

/// Waits for background e-mail tasks to record `count` confirmations.
async fn wait_for_sent(notifier: &RecordingNotifier, count: usize) {
    for _ in 0..100 {
        if notifier.sent().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Query string of a VNPay notification for `order_id`, signed by `gateway`.
fn signed_vnpay_query(gateway: &VnpayGateway, order_id: &str, amount: i64, code: &str) -> String {
    let scaled = (amount * 100).to_string();
    let mut params: CallbackParams = [
        ("vnp_TmnCode", "CINEMA01"),
        ("vnp_Amount", scaled.as_str()),
        ("vnp_BankCode", "NCB"),
        ("vnp_OrderInfo", "Thanh toan ve"),
        ("vnp_ResponseCode", code),
        ("vnp_TransactionNo", "14226112"),
        ("vnp_TransactionStatus", code),
        ("vnp_TxnRef", order_id),
    ]
    .into_iter()
    .collect();
    let hash = gateway.secure_hash(&params).unwrap();
    params.insert("vnp_SecureHash", hash);

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn booking_body(seats: &[i64]) -> Value {
    json!({
        "userId": STANDARD_USER,
        "showtimeId": OFF_PEAK_SHOWTIME,
        "seatIds": seats,
        "firstName": "An",
        "email": "an@example.com"
    })
}

#[tokio::test]
async fn vnpay_checkout_end_to_end() {
    let (app, vnpay, notifier) = app_with_notifier();

    let (status, created) = call(&app, post_json("/bookings/vnpay", booking_body(&[SEAT_B1]))).await;
    assert_eq!(status, StatusCode::CREATED);
    let pay_url = created["redirect"]["payUrl"].as_str().unwrap();
    assert!(pay_url.contains("vnp_IpAddr=203.0.113.7"));
    assert!(pay_url.contains("vnp_Amount=7500000"));

    let booking_id = created["booking"]["id"].as_i64().unwrap();
    let order_id = created["payment"]["orderId"].as_str().unwrap().to_string();
    let amount = created["payment"]["amount"].as_i64().unwrap();
    let query = signed_vnpay_query(&vnpay, &order_id, amount, "00");

    let (status, ack) = call(&app, get(&format!("/payment/vnpay/ipn?{query}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "RspCode": "00", "Message": "Confirm Success" }));
    wait_for_sent(&notifier, 1).await;
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(notifier.sent()[0].0, "an@example.com");

    // Browser return after the IPN still lands on the success page
    let response = app
        .clone()
        .oneshot(get(&format!("/payment/vnpay/return?{query}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.contains("status=success"));
    assert!(location.contains(&format!("bookingId={booking_id}")));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.sent().len(), 1, "return after the IPN must not mail again");

    let (_, detail) = call(&app, get(&format!("/bookings/{booking_id}"))).await;
    assert_eq!(detail["booking"]["status"], "CONFIRMED");
    assert_eq!(detail["booking"]["paymentMethod"], "VNPAY");

    let (_, payments) = call(&app, get(&format!("/bookings/{booking_id}/payments"))).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["status"], "SUCCESS");
}

#[tokio::test]
async fn vnpay_ipn_with_forged_hash_answers_97() {
    let (app, vnpay) = app();
    let (_, created) = call(&app, post_json("/bookings/vnpay", booking_body(&[SEAT_B2]))).await;
    let order_id = created["payment"]["orderId"].as_str().unwrap().to_string();
    let amount = created["payment"]["amount"].as_i64().unwrap();

    let query = signed_vnpay_query(&vnpay, &order_id, amount, "00")
        .replace("vnp_BankCode=NCB", "vnp_BankCode=VCB");

    let (_, ack) = call(&app, get(&format!("/payment/vnpay/ipn?{query}"))).await;
    assert_eq!(ack["RspCode"], "97");

    let booking_id = created["booking"]["id"].as_i64().unwrap();
    let (_, detail) = call(&app, get(&format!("/bookings/{booking_id}"))).await;
    assert_eq!(detail["booking"]["status"], "PENDING");
}

#[tokio::test]
async fn second_attempt_while_one_is_pending_is_a_conflict() {
    let (app, _) = app();
    let (_, created) = call(&app, post_json("/bookings/vnpay", booking_body(&[SEAT_B3]))).await;
    let booking_id = created["booking"]["id"].as_i64().unwrap();

    let (status, body) = call(
        &app,
        post_json("/payment/vnpay/create", json!({ "bookingId": booking_id })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PENDING_PAYMENT_EXISTS");
}

#[tokio::test]
async fn unconfigured_gateway_is_unavailable() {
    let (app, _) = app();

    let (status, body) = call(&app, post_json("/bookings/momo", booking_body(&[SEAT_A1]))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "GATEWAY_NOT_CONFIGURED");
}

#[tokio::test]
async fn amount_below_minimum_is_rejected_before_persisting() {
    let (app, _) = app();

    // 100 + 120 is below the 1000 minimum
    let (status, body) = call(
        &app,
        post_json("/bookings/vnpay", booking_body(&[SEAT_A1, SEAT_A2])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "AMOUNT_BELOW_MINIMUM");

    let (_, page) = call(&app, get("/bookings")).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn user_bookings_for_unknown_user_is_404() {
    let (app, _) = app();

    let (status, body) = call(&app, get("/users/999/bookings")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
}
