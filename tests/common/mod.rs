//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use secrecy::SecretString;

use cinema_booking::adapters::http::AppState;
use cinema_booking::adapters::InMemoryStore;
use cinema_booking::application::CreateBookingCommand;
use cinema_booking::config::{MomoConfig, VnpayConfig};
use cinema_booking::domain::booking::{ContactInfo, PricingPolicy};
use cinema_booking::domain::catalog::{Rider, Seat, Showtime};
use cinema_booking::domain::foundation::{
    DomainError, MovieId, SeatId, ShowtimeId, TheaterId, UserId,
};
use cinema_booking::ports::{BookingConfirmation, BookingNotifier, PaymentGateways};

pub const THEATER: i64 = 1;
/// Wednesday afternoon, no surcharge.
pub const OFF_PEAK_SHOWTIME: i64 = 10;
pub const STANDARD_USER: i64 = 100;

/// Seat A1 priced 100.
pub const SEAT_A1: i64 = 1;
/// Seat A2 priced 120.
pub const SEAT_A2: i64 = 2;
/// Seats B1..=B3 priced 75_000, above every gateway minimum.
pub const SEAT_B1: i64 = 3;
pub const SEAT_B2: i64 = 4;
pub const SEAT_B3: i64 = 5;

pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());

    store.add_showtime(Showtime {
        id: ShowtimeId::from_raw(OFF_PEAK_SHOWTIME),
        movie_id: MovieId::from_raw(7),
        theater_id: TheaterId::from_raw(THEATER),
        date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
        time: "14:00".to_string(),
        price: dec!(0),
        surcharge: None,
    });

    for (id, row, number, price) in [
        (SEAT_A1, "A", 1, dec!(100)),
        (SEAT_A2, "A", 2, dec!(120)),
        (SEAT_B1, "B", 1, dec!(75000)),
        (SEAT_B2, "B", 2, dec!(75000)),
        (SEAT_B3, "B", 3, dec!(75000)),
    ] {
        store.add_seat(Seat {
            id: SeatId::from_raw(id),
            theater_id: TheaterId::from_raw(THEATER),
            row: row.to_string(),
            number,
            seat_type: "standard".to_string(),
            price,
        });
    }

    store.add_user(Rider::new(
        UserId::from_raw(STANDARD_USER),
        "user",
        Some("an@example.com".to_string()),
        Some("An".to_string()),
    ));

    store
}

pub fn booking_command(seats: &[i64]) -> CreateBookingCommand {
    CreateBookingCommand {
        user_id: UserId::from_raw(STANDARD_USER),
        showtime_id: ShowtimeId::from_raw(OFF_PEAK_SHOWTIME),
        seat_ids: seats.iter().map(|id| SeatId::from_raw(*id)).collect(),
        contact: ContactInfo {
            email: Some("an@example.com".to_string()),
            ..ContactInfo::default()
        },
        payment_method: None,
        promotion_id: None,
        image_url: None,
    }
}

pub fn momo_config(endpoint: &str) -> MomoConfig {
    MomoConfig {
        partner_code: "MOMOTEST".to_string(),
        access_key: "F8BBA842ECF85".to_string(),
        secret_key: SecretString::new("K951B6PE1waDMi640xX08PD3vg6EkVlz".to_string()),
        endpoint: endpoint.to_string(),
        redirect_url: "http://localhost:8080/payment/momo/return".to_string(),
        ipn_url: "http://localhost:8080/payment/momo/callback".to_string(),
        partner_name: "Cinema".to_string(),
        store_id: "CinemaStore".to_string(),
        request_type: "captureWallet".to_string(),
        lang: "vi".to_string(),
    }
}

pub fn vnpay_config() -> VnpayConfig {
    VnpayConfig {
        tmn_code: "CINEMA01".to_string(),
        hash_secret: SecretString::new("SECRETKEYFORTESTS".to_string()),
        url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
        return_url: "http://localhost:8080/payment/vnpay/return".to_string(),
        ipn_url: None,
        version: "2.1.0".to_string(),
        locale: "vn".to_string(),
        order_type: "other".to_string(),
        expire_minutes: 15,
    }
}

pub fn app_state(store: Arc<InMemoryStore>, gateways: PaymentGateways) -> AppState {
    AppState {
        catalog: store.clone(),
        users: store.clone(),
        bookings: store.clone(),
        payments: store,
        notifier: Arc::new(RecordingNotifier::default()),
        gateways,
        pricing: PricingPolicy::default(),
        minimum_amount: 1000,
        confirmation_url: "http://localhost:3000/booking/confirmation".to_string(),
    }
}

/// Notifier double recording every confirmation.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, BookingConfirmation)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, BookingConfirmation)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), confirmation.clone()));
        Ok(())
    }
}
