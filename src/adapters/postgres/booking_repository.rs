//! PostgreSQL implementation of BookingRepository.
//!
//! Seat uniqueness is enforced by the partial unique index
//! `booking_seats_active_uniq`; the availability read in the orchestrator is
//! only a fast path. Every status change runs in one transaction guarded by
//! the expected current status.
//!
//! Lock order: a transaction that touches both tables locks the booking row
//! before any of its payment rows.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::domain::booking::{Booking, BookingCode, BookingStatus, NewBooking};
use crate::domain::foundation::{
    BookingId, DomainError, ErrorCode, SeatId, ShowtimeId, Timestamp, UserId,
};
use crate::ports::{
    BookingPage, BookingRepository, GuardedWrite, InsertBookingError, PageRequest,
};

use super::rows::{
    assemble_bookings, conflict, db_error, BookingRow, BookingSeatRow, Conflict,
    BOOKING_COLUMNS,
};

/// PostgreSQL implementation of the BookingRepository port.
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_seats(&self, rows: Vec<BookingRow>) -> Result<Vec<Booking>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let seats = fetch_seats(&self.pool, &ids).await?;
        assemble_bookings(rows, seats)
    }

    async fn fetch_rows(
        &self,
        filter: &str,
        bind: Option<i64>,
    ) -> Result<Vec<BookingRow>, DomainError> {
        let sql = format!(
            "SELECT {} FROM bookings {} ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<_, BookingRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("fetch bookings", e))
    }
}

/// Seat rows for the given bookings, in insertion order.
pub(super) async fn fetch_seats<'e, E>(
    executor: E,
    booking_ids: &[i64],
) -> Result<Vec<BookingSeatRow>, DomainError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, BookingSeatRow>(
        r#"
        SELECT booking_id, showtime_id, seat_id, status
        FROM booking_seats
        WHERE booking_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(booking_ids)
    .fetch_all(executor)
    .await
    .map_err(|e| db_error("fetch booking seats", e))
}

/// Releases every active seat row of a booking.
pub(super) async fn release_seats(
    conn: &mut PgConnection,
    booking_id: BookingId,
) -> Result<(), DomainError> {
    sqlx::query("UPDATE booking_seats SET status = 'cancelled' WHERE booking_id = $1 AND status = 'booked'")
        .bind(booking_id.value())
        .execute(conn)
        .await
        .map_err(|e| db_error("release booking seats", e))?;
    Ok(())
}

/// Status currently stored for a booking, read inside the caller's transaction.
async fn stored_status(
    conn: &mut PgConnection,
    id: BookingId,
) -> Result<BookingStatus, DomainError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1")
        .bind(id.value())
        .fetch_optional(conn)
        .await
        .map_err(|e| db_error("fetch booking status", e))?;
    let status = status.ok_or_else(|| not_found(id))?;
    BookingStatus::parse(&status)
        .ok_or_else(|| DomainError::database(format!("Invalid booking status: {}", status)))
}

fn not_found(id: BookingId) -> DomainError {
    DomainError::new(ErrorCode::BookingNotFound, format!("Booking {} not found", id))
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, InsertBookingError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let sql = format!(
            r#"
            INSERT INTO bookings (
                user_id, showtime_id, booking_code, total_price, status,
                first_name, last_name, email, phone_number, payment_method,
                promotion_id, image_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking.user_id.value())
            .bind(booking.showtime_id.value())
            .bind(booking.booking_code.as_str())
            .bind(booking.total_price)
            .bind(&booking.contact.first_name)
            .bind(&booking.contact.last_name)
            .bind(&booking.contact.email)
            .bind(&booking.contact.phone_number)
            .bind(booking.payment_method.map(|m| m.as_str()))
            .bind(booking.promotion_id.map(|p| p.value()))
            .bind(&booking.image_url)
            .bind(booking.created_at.as_datetime())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if conflict(&e) == Some(Conflict::DuplicateCode) {
                    return InsertBookingError::DuplicateCode;
                }
                InsertBookingError::Storage(db_error("insert booking", e))
            })?;

        let seat_ids: Vec<i64> = booking.seat_ids.iter().map(SeatId::value).collect();
        let inserted = sqlx::query(
            r#"
            INSERT INTO booking_seats (booking_id, showtime_id, seat_id, status)
            SELECT $1, $2, seat_id, 'booked' FROM UNNEST($3::BIGINT[]) AS t(seat_id)
            "#,
        )
        .bind(row.id)
        .bind(booking.showtime_id.value())
        .bind(&seat_ids)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if conflict(&e) == Some(Conflict::SeatTaken) {
                tx.rollback()
                    .await
                    .map_err(|e| db_error("roll back booking insert", e))?;
                let taken = self
                    .find_held_seat_ids(booking.showtime_id, &booking.seat_ids)
                    .await?;
                // The competing booking may already be gone again; name the request.
                let taken = if taken.is_empty() {
                    booking.seat_ids.clone()
                } else {
                    taken
                };
                return Err(InsertBookingError::SeatsTaken(taken));
            }
            return Err(InsertBookingError::Storage(db_error("insert booking seats", e)));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit booking", e))?;

        let seats = seat_ids
            .into_iter()
            .map(|seat_id| BookingSeatRow {
                booking_id: row.id,
                showtime_id: booking.showtime_id.value(),
                seat_id,
                status: "booked".to_string(),
            })
            .collect();
        Ok(row.into_booking(seats)?)
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        let rows = self.fetch_rows("WHERE id = $1", Some(id.value())).await?;
        Ok(self.with_seats(rows).await?.into_iter().next())
    }

    async fn find_by_code(&self, code: &BookingCode) -> Result<Option<Booking>, DomainError> {
        let sql = format!("SELECT {} FROM bookings WHERE booking_code = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch booking by code", e))?;
        let rows = row.into_iter().collect();
        Ok(self.with_seats(rows).await?.into_iter().next())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, DomainError> {
        let rows = self
            .fetch_rows("WHERE user_id = $1", Some(user_id.value()))
            .await?;
        self.with_seats(rows).await
    }

    async fn list(&self, page: PageRequest) -> Result<BookingPage, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("count bookings", e))?;

        let sql = format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list bookings", e))?;

        Ok(BookingPage {
            items: self.with_seats(rows).await?,
            total: total.max(0) as u64,
            page,
        })
    }

    async fn find_held_seat_ids(
        &self,
        showtime_id: ShowtimeId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<SeatId>, DomainError> {
        let ids: Vec<i64> = seat_ids.iter().map(SeatId::value).collect();
        let held: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT seat_id FROM booking_seats
            WHERE showtime_id = $1 AND status = 'booked' AND seat_id = ANY($2)
            ORDER BY seat_id
            "#,
        )
        .bind(showtime_id.value())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("check held seats", e))?;

        Ok(held.into_iter().map(SeatId::from_raw).collect())
    }

    async fn list_held_seat_ids(&self, showtime_id: ShowtimeId) -> Result<Vec<SeatId>, DomainError> {
        let held: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT seat_id FROM booking_seats
            WHERE showtime_id = $1 AND status = 'booked'
            ORDER BY seat_id
            "#,
        )
        .bind(showtime_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list held seats", e))?;

        Ok(held.into_iter().map(SeatId::from_raw).collect())
    }

    async fn save_transition(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2,
                payment_method = $3,
                updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(booking.id.value())
        .bind(booking.status.as_str())
        .bind(booking.payment_method.map(|m| m.as_str()))
        .bind(booking.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("update booking status", e))?;

        if result.rows_affected() == 0 {
            stored_status(&mut tx, booking.id).await?;
            return Ok(false);
        }

        if booking.status == BookingStatus::Cancelled {
            release_seats(&mut tx, booking.id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit booking status", e))?;
        Ok(true)
    }

    async fn save_update(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<GuardedWrite, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                status = $2,
                first_name = $3,
                last_name = $4,
                email = $5,
                phone_number = $6,
                payment_method = $7,
                image_url = $8,
                updated_at = $9
            WHERE id = $1 AND status = $10
            "#,
        )
        .bind(booking.id.value())
        .bind(booking.status.as_str())
        .bind(&booking.contact.first_name)
        .bind(&booking.contact.last_name)
        .bind(&booking.contact.email)
        .bind(&booking.contact.phone_number)
        .bind(booking.payment_method.map(|m| m.as_str()))
        .bind(&booking.image_url)
        .bind(booking.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("update booking", e))?;

        if result.rows_affected() == 0 {
            let current = stored_status(&mut tx, booking.id).await?;
            return Ok(GuardedWrite::StatusChanged(current));
        }

        if booking.status == BookingStatus::Cancelled && expected != BookingStatus::Cancelled {
            release_seats(&mut tx, booking.id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit booking update", e))?;
        Ok(GuardedWrite::Written)
    }

    async fn find_stale_pending(
        &self,
        created_before: Timestamp,
        limit: u32,
    ) -> Result<Vec<Booking>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM bookings
            WHERE status = 'pending' AND created_at < $1
            ORDER BY created_at, id
            LIMIT $2
            "#,
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(created_before.as_datetime())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("find stale bookings", e))?;
        self.with_seats(rows).await
    }

    async fn expire(&self, id: BookingId, now: Timestamp) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))?;

        let result = sqlx::query(
            "UPDATE bookings SET status = 'cancelled', updated_at = $2 WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.value())
        .bind(now.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("expire booking", e))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        release_seats(&mut tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit booking expiry", e))?;
        Ok(true)
    }
}
