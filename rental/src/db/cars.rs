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

//! Queries for the fleet.

use super::expect_one_row;
use crate::model::{Car, CarRegistration, Cents};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite;
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;

impl_from_row!(Car, |row, map_sqlx_error| {
    let registration: String = row.try_get("registration").map_err(map_sqlx_error)?;
    let make: String = row.try_get("make").map_err(map_sqlx_error)?;
    let model: String = row.try_get("model").map_err(map_sqlx_error)?;
    let trim: String = row.try_get("trim").map_err(map_sqlx_error)?;
    let year: i32 = row.try_get("year").map_err(map_sqlx_error)?;
    let color: String = row.try_get("color").map_err(map_sqlx_error)?;
    let available: bool = row.try_get("available").map_err(map_sqlx_error)?;
    let disabled: bool = row.try_get("disabled").map_err(map_sqlx_error)?;
    let price_per_day: i64 = row.try_get("price_per_day").map_err(map_sqlx_error)?;
    let pictures: String = row.try_get("pictures").map_err(map_sqlx_error)?;
    let categories: String = row.try_get("categories").map_err(map_sqlx_error)?;
    let average_rating: Option<f64> = row.try_get("average_rating").map_err(map_sqlx_error)?;

    Ok(Car {
        registration: CarRegistration::new(registration)?,
        make,
        model,
        trim,
        year,
        color,
        available,
        disabled,
        price_per_day: Cents::new(price_per_day)?,
        pictures: serde_json::from_str(&pictures)?,
        categories: serde_json::from_str(&categories)?,
        average_rating,
    })
});

/// Inserts a new `car`, failing if its registration is already known.
pub async fn insert_car(ex: &mut Executor, car: &Car) -> DbResult<()> {
    let pictures = serde_json::to_string(&car.pictures)?;
    let categories = serde_json::to_string(&car.categories)?;

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO cars (
                    registration, make, model, trim, year, color, available, disabled,
                    price_per_day, pictures, categories, average_rating
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL)";
            let done = sqlx::query(query_str)
                .bind(car.registration.as_str())
                .bind(car.make.as_str())
                .bind(car.model.as_str())
                .bind(car.trim.as_str())
                .bind(car.year)
                .bind(car.color.as_str())
                .bind(car.available)
                .bind(car.disabled)
                .bind(car.price_per_day.as_i64())
                .bind(pictures.as_str())
                .bind(categories.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO cars (
                    registration, make, model, trim, year, color, available, disabled,
                    price_per_day, pictures, categories, average_rating
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)";
            let done = sqlx::query(query_str)
                .bind(car.registration.as_str())
                .bind(car.make.as_str())
                .bind(car.model.as_str())
                .bind(car.trim.as_str())
                .bind(car.year)
                .bind(car.color.as_str())
                .bind(car.available)
                .bind(car.disabled)
                .bind(car.price_per_day.as_i64())
                .bind(pictures.as_str())
                .bind(categories.as_str())
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

/// Gets the car with `registration`.
pub async fn get_car(ex: &mut Executor, registration: &CarRegistration) -> DbResult<Car> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM cars WHERE registration = $1";
            let raw = sqlx::query(query_str)
                .bind(registration.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Car::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM cars WHERE registration = ?";
            let raw = sqlx::query(query_str)
                .bind(registration.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Car::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets all cars that have not been disabled, sorted by registration.
pub async fn get_enabled_cars(ex: &mut Executor) -> DbResult<Vec<Car>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM cars WHERE NOT disabled ORDER BY registration";
            let rows =
                sqlx::query(query_str).fetch_all(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Car::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM cars WHERE NOT disabled ORDER BY registration";
            let rows =
                sqlx::query(query_str).fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Car::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Stores the mutable properties of an existing `car`: availability, disabled state and price.
pub async fn update_car(ex: &mut Executor, car: &Car) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE cars SET available = $1, disabled = $2, price_per_day = $3
                WHERE registration = $4";
            let done = sqlx::query(query_str)
                .bind(car.available)
                .bind(car.disabled)
                .bind(car.price_per_day.as_i64())
                .bind(car.registration.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE cars SET available = ?, disabled = ?, price_per_day = ?
                WHERE registration = ?";
            let done = sqlx::query(query_str)
                .bind(car.available)
                .bind(car.disabled)
                .bind(car.price_per_day.as_i64())
                .bind(car.registration.as_str())
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

/// Sets or clears the average rating of the car with `registration`.
pub async fn set_car_rating(
    ex: &mut Executor,
    registration: &CarRegistration,
    average_rating: Option<f64>,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE cars SET average_rating = $1 WHERE registration = $2";
            let done = sqlx::query(query_str)
                .bind(average_rating)
                .bind(registration.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE cars SET average_rating = ? WHERE registration = ?";
            let done = sqlx::query(query_str)
                .bind(average_rating)
                .bind(registration.as_str())
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
