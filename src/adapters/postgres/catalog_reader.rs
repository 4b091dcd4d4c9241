//! PostgreSQL catalog and user-directory reads.
//!
//! No caching: seat availability decisions read authoritative rows.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::catalog::{Rider, Seat, Showtime};
use crate::domain::foundation::{
    DomainError, MovieId, SeatId, ShowtimeId, TheaterId, UserId,
};
use crate::ports::{CatalogReader, UserDirectory};

use super::rows::db_error;

/// Reads showtimes, seats and users from the catalog tables.
#[derive(Clone)]
pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShowtimeRow {
    id: i64,
    movie_id: i64,
    theater_id: i64,
    date: NaiveDate,
    time: String,
    price: Decimal,
    surcharge: Option<Decimal>,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: ShowtimeId::from_raw(row.id),
            movie_id: MovieId::from_raw(row.movie_id),
            theater_id: TheaterId::from_raw(row.theater_id),
            date: row.date,
            time: row.time,
            price: row.price,
            surcharge: row.surcharge,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SeatRow {
    id: i64,
    theater_id: i64,
    seat_row: String,
    seat_number: i32,
    seat_type: String,
    price: Decimal,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: SeatId::from_raw(row.id),
            theater_id: TheaterId::from_raw(row.theater_id),
            row: row.seat_row,
            number: row.seat_number,
            seat_type: row.seat_type,
            price: row.price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    role: String,
    email: Option<String>,
    name: Option<String>,
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn find_showtime(&self, id: ShowtimeId) -> Result<Option<Showtime>, DomainError> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            r#"
            SELECT id, movie_id, theater_id, date, time, price, surcharge
            FROM showtimes WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch showtime", e))?;

        Ok(row.map(Showtime::from))
    }

    async fn find_seats(
        &self,
        theater_id: TheaterId,
        seat_ids: &[SeatId],
    ) -> Result<Vec<Seat>, DomainError> {
        let ids: Vec<i64> = seat_ids.iter().map(SeatId::value).collect();
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT id, theater_id, seat_row, seat_number, seat_type, price
            FROM seats
            WHERE theater_id = $1 AND id = ANY($2)
            ORDER BY seat_row, seat_number
            "#,
        )
        .bind(theater_id.value())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch seats", e))?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn list_theater_seats(&self, theater_id: TheaterId) -> Result<Vec<Seat>, DomainError> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT id, theater_id, seat_row, seat_number, seat_type, price
            FROM seats
            WHERE theater_id = $1
            ORDER BY seat_row, seat_number
            "#,
        )
        .bind(theater_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list theater seats", e))?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }
}

#[async_trait]
impl UserDirectory for PostgresCatalogReader {
    async fn find_user(&self, id: UserId) -> Result<Option<Rider>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, role, email, name FROM users WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch user", e))?;

        Ok(row.map(|r| Rider::new(UserId::from_raw(r.id), r.role, r.email, r.name)))
    }
}
