// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Queries for bookings.

use super::expect_one_row;
use crate::model::{
    Booking, BookingId, BookingStatus, CarRegistration, Cents, Extras, PromotionId, ReviewId,
    UserId,
};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite::{self, split_timestamp};
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
use time::Date;

impl_from_row!(Booking, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let user_id: String = row.try_get("user_id").map_err(map_sqlx_error)?;
    let car: String = row.try_get("car").map_err(map_sqlx_error)?;
    let start_date: Date = row.try_get("start_date").map_err(map_sqlx_error)?;
    let end_date: Date = row.try_get("end_date").map_err(map_sqlx_error)?;
    let insurance: bool = row.try_get("insurance").map_err(map_sqlx_error)?;
    let gps: bool = row.try_get("gps").map_err(map_sqlx_error)?;
    let child_seat: bool = row.try_get("child_seat").map_err(map_sqlx_error)?;
    let chauffeur: bool = row.try_get("chauffeur").map_err(map_sqlx_error)?;
    let promotion_id: Option<String> = row.try_get("promotion_id").map_err(map_sqlx_error)?;
    let total_cost: i64 = row.try_get("total_cost").map_err(map_sqlx_error)?;
    let paid: i64 = row.try_get("paid").map_err(map_sqlx_error)?;
    let status: String = row.try_get("status").map_err(map_sqlx_error)?;
    let pickup_location: String = row.try_get("pickup_location").map_err(map_sqlx_error)?;
    let dropoff_location: String = row.try_get("dropoff_location").map_err(map_sqlx_error)?;
    let review_id: Option<String> = row.try_get("review_id").map_err(map_sqlx_error)?;
    let created = get_timestamp(&row, "created")?;

    Ok(Booking {
        id: BookingId::parse(&id)?,
        user_id: UserId::new(user_id)?,
        car: CarRegistration::new(car)?,
        start_date,
        end_date,
        extras: Extras { insurance, gps, child_seat, chauffeur },
        promotion_id: promotion_id.as_deref().map(PromotionId::parse).transpose()?,
        total_cost: Cents::new(total_cost)?,
        paid: Cents::new(paid)?,
        status: BookingStatus::parse(&status)?,
        pickup_location,
        dropoff_location,
        created,
        review_id: review_id.as_deref().map(ReviewId::parse).transpose()?,
    })
});

/// Inserts a new `booking`.  The review identifier is ignored as it is derived from the reviews.
pub async fn insert_booking(ex: &mut Executor, booking: &Booking) -> DbResult<()> {
    let promotion_id = booking.promotion_id.map(|id| id.to_string());

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO bookings (
                    id, user_id, car, start_date, end_date,
                    insurance, gps, child_seat, chauffeur,
                    promotion_id, total_cost, paid, status,
                    pickup_location, dropoff_location, created
                ) VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
                )";
            let done = sqlx::query(query_str)
                .bind(booking.id.to_string())
                .bind(booking.user_id.as_str())
                .bind(booking.car.as_str())
                .bind(booking.start_date)
                .bind(booking.end_date)
                .bind(booking.extras.insurance)
                .bind(booking.extras.gps)
                .bind(booking.extras.child_seat)
                .bind(booking.extras.chauffeur)
                .bind(promotion_id)
                .bind(booking.total_cost.as_i64())
                .bind(booking.paid.as_i64())
                .bind(booking.status.as_str())
                .bind(booking.pickup_location.as_str())
                .bind(booking.dropoff_location.as_str())
                .bind(booking.created)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_secs, created_nsecs) = split_timestamp(booking.created)?;

            let query_str = "
                INSERT INTO bookings (
                    id, user_id, car, start_date, end_date,
                    insurance, gps, child_seat, chauffeur,
                    promotion_id, total_cost, paid, status,
                    pickup_location, dropoff_location, created_secs, created_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(booking.id.to_string())
                .bind(booking.user_id.as_str())
                .bind(booking.car.as_str())
                .bind(booking.start_date)
                .bind(booking.end_date)
                .bind(booking.extras.insurance)
                .bind(booking.extras.gps)
                .bind(booking.extras.child_seat)
                .bind(booking.extras.chauffeur)
                .bind(promotion_id)
                .bind(booking.total_cost.as_i64())
                .bind(booking.paid.as_i64())
                .bind(booking.status.as_str())
                .bind(booking.pickup_location.as_str())
                .bind(booking.dropoff_location.as_str())
                .bind(created_secs)
                .bind(created_nsecs)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the booking identified by `id`.
pub async fn get_booking(ex: &mut Executor, id: BookingId) -> DbResult<Booking> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT b.*, r.id AS review_id
                FROM bookings b LEFT JOIN reviews r ON r.booking_id = b.id
                WHERE b.id = $1";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Booking::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT b.*, r.id AS review_id
                FROM bookings b LEFT JOIN reviews r ON r.booking_id = b.id
                WHERE b.id = ?";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Booking::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets all bookings of `user_id` sorted by start date.
pub async fn get_user_bookings(ex: &mut Executor, user_id: &UserId) -> DbResult<Vec<Booking>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT b.*, r.id AS review_id
                FROM bookings b LEFT JOIN reviews r ON r.booking_id = b.id
                WHERE b.user_id = $1
                ORDER BY b.start_date, b.created";
            let rows = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Booking::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT b.*, r.id AS review_id
                FROM bookings b LEFT JOIN reviews r ON r.booking_id = b.id
                WHERE b.user_id = ?
                ORDER BY b.start_date, b.created_secs, b.created_nsecs";
            let rows = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Booking::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Counts the bookings of `car` that are not cancelled and whose window intersects the
/// half-open window `[start_date, end_date)`.
pub async fn count_overlapping_bookings(
    ex: &mut Executor,
    car: &CarRegistration,
    start_date: Date,
    end_date: Date,
) -> DbResult<i64> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM bookings
                WHERE car = $1 AND status <> 'cancelled' AND start_date < $2 AND end_date > $3";
            let row = sqlx::query(query_str)
                .bind(car.as_str())
                .bind(end_date)
                .bind(start_date)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM bookings
                WHERE car = ? AND status <> 'cancelled' AND start_date < ? AND end_date > ?";
            let row = sqlx::query(query_str)
                .bind(car.as_str())
                .bind(end_date)
                .bind(start_date)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Records the cumulative `paid` amount and the `status` of booking `id`.
pub async fn update_booking_payment(
    ex: &mut Executor,
    id: BookingId,
    paid: Cents,
    status: BookingStatus,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE bookings SET paid = $1, status = $2 WHERE id = $3";
            let done = sqlx::query(query_str)
                .bind(paid.as_i64())
                .bind(status.as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE bookings SET paid = ?, status = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(paid.as_i64())
                .bind(status.as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Sets the `status` of booking `id`.
pub async fn set_booking_status(
    ex: &mut Executor,
    id: BookingId,
    status: BookingStatus,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE bookings SET status = $1 WHERE id = $2";
            let done = sqlx::query(query_str)
                .bind(status.as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE bookings SET status = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(status.as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Deletes booking `id` together with its payments, payment sessions and review.
pub async fn delete_booking(ex: &mut Executor, id: BookingId) -> DbResult<()> {
    let id = id.to_string();

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            for query_str in [
                "DELETE FROM payments WHERE booking_id = $1",
                "DELETE FROM payment_sessions WHERE booking_id = $1",
                "DELETE FROM reviews WHERE booking_id = $1",
            ] {
                sqlx::query(query_str)
                    .bind(id.as_str())
                    .execute(ex.conn())
                    .await
                    .map_err(postgres::map_sqlx_error)?;
            }

            let query_str = "DELETE FROM bookings WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            for query_str in [
                "DELETE FROM payments WHERE booking_id = ?",
                "DELETE FROM payment_sessions WHERE booking_id = ?",
                "DELETE FROM reviews WHERE booking_id = ?",
            ] {
                sqlx::query(query_str)
                    .bind(id.as_str())
                    .execute(ex.conn())
                    .await
                    .map_err(sqlite::map_sqlx_error)?;
            }

            let query_str = "DELETE FROM bookings WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}
