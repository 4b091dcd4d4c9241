//! In-process store implementing every storage and catalog port.
//!
//! All state sits behind one mutex, so each port method is one atomic unit.
//! The store enforces the same uniqueness rules as the PostgreSQL schema:
//! one active assignment per (showtime, seat), unique booking codes and at
//! most one pending payment per booking.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::booking::{
    Booking, BookingCode, BookingSeatStatus, BookingStatus, NewBooking,
};
use crate::domain::catalog::{Rider, Seat, Showtime};
use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, PaymentId, SeatId, ShowtimeId, TheaterId, Timestamp,
    UserId,
};
use crate::domain::payment::{
    settle, GatewayCallback, GatewayKind, NewPayment, Payment, PaymentStatus,
};
use crate::ports::{
    BookingPage, BookingRepository, CatalogReader, GuardedWrite, InsertBookingError,
    InsertPaymentError, PageRequest, PaymentRepository, SettlementRecord, UserDirectory,
};

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, Rider>,
    showtimes: HashMap<ShowtimeId, Showtime>,
    seats: BTreeMap<SeatId, Seat>,
    bookings: BTreeMap<BookingId, Booking>,
    payments: BTreeMap<PaymentId, Payment>,
    last_booking_id: i64,
    last_payment_id: i64,
}

impl StoreState {
    fn held_seats(&self, showtime_id: ShowtimeId) -> BTreeSet<SeatId> {
        self.bookings
            .values()
            .filter(|b| b.showtime_id == showtime_id)
            .flat_map(|b| b.seats.iter())
            .filter(|s| s.status == BookingSeatStatus::Booked)
            .map(|s| s.seat_id)
            .collect()
    }
}

/// In-memory implementation of the storage, catalog and user-directory ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Seeding ===

    pub fn add_user(&self, rider: Rider) {
        self.state().users.insert(rider.id, rider);
    }

    pub fn add_showtime(&self, showtime: Showtime) {
        self.state().showtimes.insert(showtime.id, showtime);
    }

    pub fn add_seat(&self, seat: Seat) {
        self.state().seats.insert(seat.id, seat);
    }

    /// Writes a payment row as-is, bypassing the pending-attempt rule.
    pub fn put_payment(&self, payment: Payment) {
        let mut state = self.state();
        state.last_payment_id = state.last_payment_id.max(payment.id.value());
        state.payments.insert(payment.id, payment);
    }

    // === Inspection ===

    pub fn booking_count(&self) -> usize {
        self.state().bookings.len()
    }

    pub fn payment_count(&self) -> usize {
        self.state().payments.len()
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn find_showtime(&self, id: ShowtimeId) -> Result<Option<Showtime>, DomainError> {
        Ok(self.state().showtimes.get(&id).cloned())
    }

    async fn find_seats(
        &self,
        theater_id: TheaterId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<Seat>, DomainError> {
        let state = self.state();
        Ok(seat_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| state.seats.get(id))
            .filter(|seat| seat.theater_id == theater_id)
            .cloned()
            .collect())
    }

    async fn list_theater_seats(&self, theater_id: TheaterId) -> Result<Vec<Seat>, DomainError> {
        let mut seats: Vec<Seat> = self
            .state()
            .seats
            .values()
            .filter(|seat| seat.theater_id == theater_id)
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.row.cmp(&b.row).then(a.number.cmp(&b.number)));
        Ok(seats)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<Rider>, DomainError> {
        Ok(self.state().users.get(&id).cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, InsertBookingError> {
        let mut state = self.state();

        let held = state.held_seats(booking.showtime_id);
        let taken: Vec<SeatId> = booking
            .seat_ids
            .iter()
            .filter(|id| held.contains(*id))
            .copied()
            .collect();
        if !taken.is_empty() {
            return Err(InsertBookingError::SeatsTaken(taken));
        }
        if state
            .bookings
            .values()
            .any(|b| b.booking_code == booking.booking_code)
        {
            return Err(InsertBookingError::DuplicateCode);
        }

        state.last_booking_id += 1;
        let created = booking
            .clone()
            .into_booking(BookingId::from_raw(state.last_booking_id));
        state.bookings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.state().bookings.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &BookingCode) -> Result<Option<Booking>, DomainError> {
        Ok(self
            .state()
            .bookings
            .values()
            .find(|b| &b.booking_code == code)
            .cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, DomainError> {
        Ok(self
            .state()
            .bookings
            .values()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list(&self, page: PageRequest) -> Result<BookingPage, DomainError> {
        let state = self.state();
        let items = state
            .bookings
            .values()
            .rev()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(BookingPage {
            items,
            total: state.bookings.len() as u64,
            page,
        })
    }

    async fn find_held_seat_ids(
        &self,
        showtime_id: ShowtimeId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<SeatId>, DomainError> {
        let held = self.state().held_seats(showtime_id);
        Ok(seat_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|id| held.contains(*id))
            .copied()
            .collect())
    }

    async fn list_held_seat_ids(&self, showtime_id: ShowtimeId) -> Result<Vec<SeatId>, DomainError> {
        Ok(self.state().held_seats(showtime_id).into_iter().collect())
    }

    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(stored) = state.bookings.get_mut(&booking.id) else {
            return Err(DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking {} not found", booking.id),
            ));
        };
        if stored.status != expected {
            return Ok(false);
        }

        stored.status = booking.status;
        stored.payment_method = booking.payment_method;
        stored.updated_at = booking.updated_at;
        if booking.status == BookingStatus::Cancelled {
            for seat in &mut stored.seats {
                seat.status = BookingSeatStatus::Cancelled;
            }
        }
        Ok(true)
    }

    async fn save_update(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<GuardedWrite, DomainError> {
        let mut state = self.state();
        let stored = state.bookings.get_mut(&booking.id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking {} not found", booking.id),
            )
        })?;
        if stored.status != expected {
            return Ok(GuardedWrite::StatusChanged(stored.status));
        }

        stored.status = booking.status;
        stored.contact = booking.contact.clone();
        stored.payment_method = booking.payment_method;
        stored.image_url = booking.image_url.clone();
        stored.updated_at = booking.updated_at;
        if booking.status == BookingStatus::Cancelled {
            for seat in &mut stored.seats {
                seat.status = BookingSeatStatus::Cancelled;
            }
        }
        Ok(GuardedWrite::Written)
    }

    async fn find_stale_pending(
        &self,
        created_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<Booking>, DomainError> {
        let mut stale: Vec<Booking> = self
            .state()
            .bookings
            .values()
            .filter(|b| b.is_pending() && b.created_at.is_before(&created_before))
            .cloned()
            .collect();
        stale.sort_by_key(|b| (b.created_at, b.id));
        stale.truncate(limit as usize);
        Ok(stale)
    }

    async fn expire(&self, id: BookingId, now: Timestamp) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(booking) = state.bookings.get_mut(&id) else {
            return Ok(false);
        };
        if !booking.is_pending() {
            return Ok(false);
        }
        booking.cancel(now)?;
        Ok(true)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn insert(&self, payment: &NewPayment) -> Result<Payment, InsertPaymentError> {
        let mut state = self.state();

        if !state.bookings.contains_key(&payment.booking_id) {
            return Err(InsertPaymentError::Storage(DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking {} not found", payment.booking_id),
            )));
        }
        if state
            .payments
            .values()
            .any(|p| p.booking_id == payment.booking_id && p.status == PaymentStatus::Pending)
        {
            return Err(InsertPaymentError::PendingExists);
        }

        state.last_payment_id += 1;
        let created = payment
            .clone()
            .into_payment(PaymentId::from_raw(state.last_payment_id));
        state.payments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.state().payments.get(&id).cloned())
    }

    async fn find_latest_by_order(
        &self,
        provider: GatewayKind,
        order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .state()
            .payments
            .values()
            .filter(|p| p.provider == provider && p.order_id == order_id)
            .max_by_key(|p| (p.created_at, p.id))
            .cloned())
    }

    async fn list_by_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>, DomainError> {
        let mut payments: Vec<Payment> = self
            .state()
            .payments
            .values()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(payments)
    }

    async fn apply_callback(
        &self,
        payment_id: PaymentId,
        callback: &GatewayCallback,
        now: Timestamp,
    ) -> Result<SettlementRecord, DomainError> {
        let mut state = self.state();

        let mut payment = state.payments.get(&payment_id).cloned().ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment_id),
            )
        })?;
        let mut booking = state.bookings.get(&payment.booking_id).cloned().ok_or_else(|| {
            DomainError::new(
                ErrorCode::BookingNotFound,
                format!("Booking {} not found", payment.booking_id),
            )
        })?;

        let settlement = settle(&mut payment, &mut booking, callback, now);
        if !settlement.is_replay() {
            state.payments.insert(payment.id, payment.clone());
            state.bookings.insert(booking.id, booking.clone());
        }

        Ok(SettlementRecord {
            settlement,
            payment,
            booking,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::ContactInfo;
    use crate::domain::foundation::MovieId;
    use crate::domain::payment::{BookingTransition, Settlement};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_showtime(Showtime {
            id: ShowtimeId::from_raw(1),
            movie_id: MovieId::from_raw(1),
            theater_id: TheaterId::from_raw(1),
            date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            time: "14:00".to_string(),
            price: dec!(0),
            surcharge: None,
        });
        for (id, number) in [(1, 1), (2, 2), (3, 3)] {
            store.add_seat(Seat {
                id: SeatId::from_raw(id),
                theater_id: TheaterId::from_raw(1),
                row: "A".to_string(),
                number,
                seat_type: "standard".to_string(),
                price: dec!(100),
            });
        }
        store
    }

    fn new_booking(code: &str, seats: &[i64]) -> NewBooking {
        NewBooking {
            user_id: UserId::from_raw(1),
            showtime_id: ShowtimeId::from_raw(1),
            booking_code: BookingCode::from_raw(code),
            total_price: dec!(200),
            contact: ContactInfo::default(),
            payment_method: None,
            promotion_id: None,
            image_url: None,
            seat_ids: seats.iter().map(|id| SeatId::from_raw(*id)).collect(),
            created_at: Timestamp::now(),
        }
    }

    fn new_payment(booking_id: BookingId) -> NewPayment {
        NewPayment {
            booking_id,
            order_id: "BK-1-aaaaaaa".to_string(),
            request_id: None,
            amount: 200,
            provider: GatewayKind::Momo,
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn overlapping_insert_reports_taken_seats() {
        let store = seeded();
        BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1, 2]))
            .await
            .unwrap();

        let err = BookingRepository::insert(&store, &new_booking("BK-2-bbbbbbb", &[2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, InsertBookingError::SeatsTaken(ids) if ids == vec![SeatId::from_raw(2)]));
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let store = seeded();
        BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1])).await.unwrap();

        let err = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[2]))
            .await
            .unwrap_err();
        assert!(matches!(err, InsertBookingError::DuplicateCode));
    }

    #[tokio::test]
    async fn cancelled_seats_are_released() {
        let store = seeded();
        let mut booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1, 2]))
            .await
            .unwrap();
        booking.cancel(Timestamp::now()).unwrap();
        assert!(store
            .save_transition(&booking, BookingStatus::Pending)
            .await
            .unwrap());

        let held = store.list_held_seat_ids(ShowtimeId::from_raw(1)).await.unwrap();
        assert!(held.is_empty());
        assert!(BookingRepository::insert(&store, &new_booking("BK-2-bbbbbbb", &[1, 2]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn stale_transition_is_not_written() {
        let store = seeded();
        let mut booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1]))
            .await
            .unwrap();
        booking.cancel(Timestamp::now()).unwrap();

        let written = store
            .save_transition(&booking, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert!(!written);
        let stored = BookingRepository::find_by_id(&store, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn second_pending_payment_is_rejected() {
        let store = seeded();
        let booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1]))
            .await
            .unwrap();
        PaymentRepository::insert(&store, &new_payment(booking.id)).await.unwrap();

        let err = PaymentRepository::insert(&store, &new_payment(booking.id))
            .await
            .unwrap_err();
        assert!(matches!(err, InsertPaymentError::PendingExists));
    }

    #[tokio::test]
    async fn apply_callback_settles_both_rows_once() {
        let store = seeded();
        let booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1]))
            .await
            .unwrap();
        let payment = PaymentRepository::insert(&store, &new_payment(booking.id))
            .await
            .unwrap();
        let callback = GatewayCallback {
            gateway: GatewayKind::Momo,
            order_id: "BK-1-aaaaaaa".to_string(),
            transaction_id: Some("1".to_string()),
            amount: 200,
            result_code: 0,
            message: "ok".to_string(),
            succeeded: true,
            signature: "sig".to_string(),
        };

        let first = store
            .apply_callback(payment.id, &callback, Timestamp::now())
            .await
            .unwrap();
        assert_eq!(
            first.settlement,
            Settlement::Applied {
                status: PaymentStatus::Success,
                booking: BookingTransition::Confirmed
            }
        );

        let second = store
            .apply_callback(payment.id, &callback, Timestamp::now())
            .await
            .unwrap();
        assert!(second.settlement.is_replay());
        assert_eq!(second.booking.status, BookingStatus::Confirmed);
        assert_eq!(store.payment_count(), 1);
    }

    #[tokio::test]
    async fn expire_cancels_booking_but_leaves_payment_pending() {
        let store = seeded();
        let booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1, 2]))
            .await
            .unwrap();
        let payment = PaymentRepository::insert(&store, &new_payment(booking.id))
            .await
            .unwrap();

        assert!(store.expire(booking.id, Timestamp::now()).await.unwrap());
        assert!(!store.expire(booking.id, Timestamp::now()).await.unwrap());

        let booking = BookingRepository::find_by_id(&store, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(store.list_held_seat_ids(ShowtimeId::from_raw(1)).await.unwrap().is_empty());
        let payment = PaymentRepository::find_by_id(&store, payment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        // The untouched attempt still blocks a second one.
        let retry = PaymentRepository::insert(&store, &new_payment(booking.id)).await;
        assert!(matches!(retry, Err(InsertPaymentError::PendingExists)));
    }

    #[tokio::test]
    async fn save_update_writes_details_and_status_together() {
        let store = seeded();
        let mut booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1]))
            .await
            .unwrap();
        booking.contact.email = Some("an@example.com".to_string());
        booking.cancel(Timestamp::now()).unwrap();

        let outcome = store
            .save_update(&booking, BookingStatus::Pending)
            .await
            .unwrap();

        assert_eq!(outcome, GuardedWrite::Written);
        let stored = BookingRepository::find_by_id(&store, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.contact.email.as_deref(), Some("an@example.com"));
        assert!(stored
            .seats
            .iter()
            .all(|s| s.status == BookingSeatStatus::Cancelled));
    }

    #[tokio::test]
    async fn save_update_reports_status_that_won() {
        let store = seeded();
        let mut booking = BookingRepository::insert(&store, &new_booking("BK-1-aaaaaaa", &[1]))
            .await
            .unwrap();
        store.expire(booking.id, Timestamp::now()).await.unwrap();
        booking.contact.email = Some("late@example.com".to_string());

        let outcome = store
            .save_update(&booking, BookingStatus::Pending)
            .await
            .unwrap();

        assert_eq!(outcome, GuardedWrite::StatusChanged(BookingStatus::Cancelled));
        let stored = BookingRepository::find_by_id(&store, booking.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.contact.email, None);
    }

    #[tokio::test]
    async fn find_seats_ignores_other_theaters() {
        let store = seeded();
        store.add_seat(Seat {
            id: SeatId::from_raw(9),
            theater_id: TheaterId::from_raw(2),
            row: "Z".to_string(),
            number: 1,
            seat_type: "vip".to_string(),
            price: dec!(300),
        });

        let seats = store
            .find_seats(TheaterId::from_raw(1), &[SeatId::from_raw(1), SeatId::from_raw(9)])
            .await
            .unwrap();
        assert_eq!(seats.len(), 1);
        assert_eq!(seats[0].id, SeatId::from_raw(1));
    }
}
