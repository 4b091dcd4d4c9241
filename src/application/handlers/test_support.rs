//! Shared fixtures for handler tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

use crate::adapters::memory::InMemoryStore;
use crate::domain::booking::ContactInfo;
use crate::domain::catalog::{Rider, Seat, Showtime};
use crate::domain::foundation::{
    DomainError, ErrorCode, MovieId, SeatId, ShowtimeId, TheaterId, UserId,
};
use crate::domain::payment::{CallbackParams, GatewayCallback, GatewayKind};
use crate::ports::{
    BookingConfirmation, BookingNotifier, PaymentError, PaymentGateway, PaymentRedirect,
    PaymentRequest,
};

use super::booking::CreateBookingCommand;

pub const THEATER: i64 = 1;
/// Wednesday 2024-03-06 at 14:00.
pub const OFF_PEAK_SHOWTIME: i64 = 10;
/// Saturday 2024-03-09 at 20:00.
pub const PEAK_SHOWTIME: i64 = 11;
pub const STANDARD_USER: i64 = 100;
pub const STUDENT_USER: i64 = 101;

/// Store with two showtimes in one theater, seats 1 (100) and 2 (120) plus
/// seats 3..=5 at 50_000, a standard and a student user.
pub fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());

    for (id, date, time) in [
        (OFF_PEAK_SHOWTIME, NaiveDate::from_ymd_opt(2024, 3, 6), "14:00"),
        (PEAK_SHOWTIME, NaiveDate::from_ymd_opt(2024, 3, 9), "20:00"),
    ] {
        store.add_showtime(Showtime {
            id: ShowtimeId::from_raw(id),
            movie_id: MovieId::from_raw(1),
            theater_id: TheaterId::from_raw(THEATER),
            date: date.unwrap(),
            time: time.to_string(),
            price: dec!(0),
            surcharge: None,
        });
    }

    let seats = [
        (1, "A", 1, dec!(100)),
        (2, "A", 2, dec!(120)),
        (3, "B", 1, dec!(50000)),
        (4, "B", 2, dec!(50000)),
        (5, "B", 3, dec!(50000)),
    ];
    for (id, row, number, price) in seats {
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
    store.add_user(Rider::new(
        UserId::from_raw(STUDENT_USER),
        "student",
        Some("binh@example.com".to_string()),
        Some("Binh".to_string()),
    ));

    store
}

pub fn booking_command(user: i64, showtime: i64, seats: &[i64]) -> CreateBookingCommand {
    CreateBookingCommand {
        user_id: UserId::from_raw(user),
        showtime_id: ShowtimeId::from_raw(showtime),
        seat_ids: seats.iter().map(|id| SeatId::from_raw(*id)).collect(),
        contact: ContactInfo::default(),
        payment_method: None,
        promotion_id: None,
        image_url: None,
    }
}

/// Gateway double: records requests, succeeds or fails on demand, and
/// authenticates callbacks carrying `signature=valid`.
pub struct MockGateway {
    kind: GatewayKind,
    fail_with: Option<PaymentError>,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl MockGateway {
    pub fn new(kind: GatewayKind) -> Self {
        Self {
            kind,
            fail_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: GatewayKind, error: PaymentError) -> Self {
        Self {
            kind,
            fail_with: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Callback params this mock accepts.
    pub fn callback(order_id: &str, amount: i64, succeeded: bool) -> CallbackParams {
        [
            ("orderId", order_id.to_string()),
            ("amount", amount.to_string()),
            ("succeeded", succeeded.to_string()),
            ("transId", "T-1".to_string()),
            ("signature", "valid".to_string()),
        ]
        .into_iter()
        .collect()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn kind(&self) -> GatewayKind {
        self.kind
    }

    async fn create_payment_request(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentRedirect, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(PaymentRedirect {
            redirect_url: format!("https://pay.example.com/{}", request.order_id),
            provider_request_id: Some(request.request_id.clone()),
            qr_code_url: None,
            deeplink: None,
        })
    }

    fn verify_callback_signature(&self, params: &CallbackParams) -> bool {
        params.get("signature") == Some("valid")
    }

    fn parse_callback(&self, params: &CallbackParams) -> Result<GatewayCallback, PaymentError> {
        if !self.verify_callback_signature(params) {
            return Err(PaymentError::invalid_signature());
        }
        let succeeded = params.get("succeeded") == Some("true");
        Ok(GatewayCallback {
            gateway: self.kind,
            order_id: params.get_or_empty("orderId").to_string(),
            transaction_id: params.get("transId").map(str::to_string),
            amount: params
                .get_or_empty("amount")
                .parse()
                .map_err(|_| PaymentError::invalid_callback("amount"))?,
            result_code: if succeeded { 0 } else { 1 },
            message: String::new(),
            succeeded,
            signature: "valid".to_string(),
        })
    }
}

/// Notifier double recording every confirmation.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, BookingConfirmation)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

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
        if self.fail {
            return Err(DomainError::new(ErrorCode::InternalError, "mail down"));
        }
        Ok(())
    }
}
