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

//! Queries for reviews.

use crate::model::{BookingId, CarRegistration, Rating, Review, ReviewId, UserId};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite::{self, split_timestamp};
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;

impl_from_row!(Review, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let booking_id: String = row.try_get("booking_id").map_err(map_sqlx_error)?;
    let user_id: String = row.try_get("user_id").map_err(map_sqlx_error)?;
    let rating: i32 = row.try_get("rating").map_err(map_sqlx_error)?;
    let comment: String = row.try_get("comment").map_err(map_sqlx_error)?;
    let created = get_timestamp(&row, "created")?;

    Ok(Review {
        id: ReviewId::parse(&id)?,
        booking_id: BookingId::parse(&booking_id)?,
        user_id: UserId::new(user_id)?,
        rating: Rating::new(i64::from(rating))?,
        comment,
        created,
    })
});

/// Inserts a new `review`.  Fails with `AlreadyExists` if the booking was already reviewed.
pub async fn insert_review(ex: &mut Executor, review: &Review) -> DbResult<()> {
    let rating = i32::from(review.rating.stars());

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO reviews (id, booking_id, user_id, rating, comment, created)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(review.id.to_string())
                .bind(review.booking_id.to_string())
                .bind(review.user_id.as_str())
                .bind(rating)
                .bind(review.comment.as_str())
                .bind(review.created)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_secs, created_nsecs) = split_timestamp(review.created)?;

            let query_str = "
                INSERT INTO reviews (
                    id, booking_id, user_id, rating, comment, created_secs, created_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(review.id.to_string())
                .bind(review.booking_id.to_string())
                .bind(review.user_id.as_str())
                .bind(rating)
                .bind(review.comment.as_str())
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

/// Gets the reviews left for any booking of `car`, oldest first.
pub async fn get_car_reviews(ex: &mut Executor, car: &CarRegistration) -> DbResult<Vec<Review>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT r.*
                FROM reviews r JOIN bookings b ON r.booking_id = b.id
                WHERE b.car = $1
                ORDER BY r.created";
            let rows = sqlx::query(query_str)
                .bind(car.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Review::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT r.*
                FROM reviews r JOIN bookings b ON r.booking_id = b.id
                WHERE b.car = ?
                ORDER BY r.created_secs, r.created_nsecs";
            let rows = sqlx::query(query_str)
                .bind(car.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Review::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
