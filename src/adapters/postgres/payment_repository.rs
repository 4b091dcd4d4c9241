//! PostgreSQL implementation of PaymentRepository.
//!
//! Settlement locks the booking, then the payment row, applies [`settle`]
//! and writes both rows (and released seats) in one transaction. The booking
//! repository takes its locks in the same order.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, PaymentId, Timestamp};
use crate::domain::payment::{
    settle, BookingTransition, GatewayCallback, GatewayKind, NewPayment, Payment, Settlement,
};
use crate::ports::{InsertPaymentError, PaymentRepository, SettlementRecord};

use super::booking_repository::{fetch_seats, release_seats};
use super::rows::{
    conflict, db_error, BookingRow, Conflict, PaymentRow, BOOKING_COLUMNS, PAYMENT_COLUMNS,
};

/// Locks the booking row first, matching the order used for every write
/// that touches both tables.
const LOCK_BOOKING_SQL: &str = "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE";
const LOCK_PAYMENT_SQL: &str = "SELECT {} FROM payments WHERE id = $1 FOR UPDATE";

/// PostgreSQL implementation of the PaymentRepository port.
#[derive(Clone)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn insert(&self, payment: &NewPayment) -> Result<Payment, InsertPaymentError> {
        let sql = format!(
            r#"
            INSERT INTO payments (
                booking_id, order_id, request_id, amount, provider, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, 'pending', $6, $6)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment.booking_id.value())
            .bind(&payment.order_id)
            .bind(&payment.request_id)
            .bind(payment.amount)
            .bind(payment.provider.as_str())
            .bind(payment.created_at.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match conflict(&e) {
                Some(Conflict::PendingPayment) => InsertPaymentError::PendingExists,
                Some(Conflict::UnknownBooking) => InsertPaymentError::Storage(DomainError::new(
                    ErrorCode::BookingNotFound,
                    format!("Booking {} not found", payment.booking_id),
                )),
                _ => InsertPaymentError::Storage(db_error("insert payment", e)),
            })?;

        Ok(Payment::try_from(row)?)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch payment", e))?
            .map(Payment::try_from)
            .transpose()
    }

    async fn find_latest_by_order(
        &self,
        provider: GatewayKind,
        order_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM payments
            WHERE provider = $1 AND order_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
            PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(provider.as_str())
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch payment by order", e))?
            .map(Payment::try_from)
            .transpose()
    }

    async fn list_by_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE booking_id = $1 ORDER BY created_at DESC, id DESC",
            PAYMENT_COLUMNS
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(booking_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list payments", e))?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    async fn apply_callback(
        &self,
        payment_id: PaymentId,
        callback: &GatewayCallback,
        now: Timestamp,
    ) -> Result<SettlementRecord, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let payment_not_found = || {
            DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment {} not found", payment_id),
            )
        };

        // booking_id never changes, so it can be read before either lock
        let booking_id: i64 = sqlx::query_scalar("SELECT booking_id FROM payments WHERE id = $1")
            .bind(payment_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("fetch payment booking", e))?
            .ok_or_else(payment_not_found)?;

        let sql = LOCK_BOOKING_SQL.replacen("{}", BOOKING_COLUMNS, 1);
        let booking_row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("lock booking", e))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::BookingNotFound,
                    format!("Booking {} not found", booking_id),
                )
            })?;

        let sql = LOCK_PAYMENT_SQL.replacen("{}", PAYMENT_COLUMNS, 1);
        let mut payment: Payment = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("lock payment", e))?
            .ok_or_else(payment_not_found)?
            .try_into()?;

        let seats = fetch_seats(&mut *tx, &[booking_row.id]).await?;
        let mut booking = booking_row.into_booking(seats)?;

        let settlement = settle(&mut payment, &mut booking, callback, now);
        if settlement.is_replay() {
            tx.rollback()
                .await
                .map_err(|e| db_error("release settlement locks", e))?;
            return Ok(SettlementRecord {
                settlement,
                payment,
                booking,
            });
        }

        sqlx::query(
            r#"
            UPDATE payments SET
                status = $2,
                transaction_id = $3,
                result_code = $4,
                message = $5,
                signature = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(payment.id.value())
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.result_code)
        .bind(&payment.message)
        .bind(&payment.signature)
        .bind(payment.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("settle payment", e))?;

        if let Settlement::Applied {
            booking: transition,
            ..
        } = settlement
        {
            if transition != BookingTransition::Unchanged {
                sqlx::query(
                    "UPDATE bookings SET status = $2, payment_method = $3, updated_at = $4 WHERE id = $1",
                )
                .bind(booking.id.value())
                .bind(booking.status.as_str())
                .bind(booking.payment_method.map(|m| m.as_str()))
                .bind(booking.updated_at.as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("settle booking", e))?;
            }
            if transition == BookingTransition::Cancelled {
                release_seats(&mut tx, booking.id).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit settlement", e))?;

        Ok(SettlementRecord {
            settlement,
            payment,
            booking,
        })
    }
}
