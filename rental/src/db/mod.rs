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

//! Database abstraction for the rental service.
//!
//! Every function takes an `Executor` and issues the query written for the backend behind it.
//! Identifiers are stored as text, money as integer cents and lists of strings as JSON text.
//! Aggregations (sums of payments, averages of ratings) happen in the driver so that the queries
//! stay identical in shape across backends.

#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite;
use autorent_core::db::{DbError, DbResult, Executor};

/// Implements the conversion of raw rows into `$type` for every supported backend.
///
/// The `$body` sees the raw row as `$row` and the backend's error mapping function as `$map`.
/// When requested, `$ts(&row, "column")` extracts the timestamp stored under `column` using the
/// backend's own representation.
macro_rules! impl_from_row [
    ( $type:ty, |$row:ident, $map:ident| $body:block ) => {
        #[cfg(feature = "postgres")]
        impl TryFrom<sqlx::postgres::PgRow> for $type {
            type Error = autorent_core::db::DbError;

            fn try_from($row: sqlx::postgres::PgRow) -> autorent_core::db::DbResult<Self> {
                use autorent_core::db::postgres::map_sqlx_error as $map;
                $body
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        impl TryFrom<sqlx::sqlite::SqliteRow> for $type {
            type Error = autorent_core::db::DbError;

            fn try_from($row: sqlx::sqlite::SqliteRow) -> autorent_core::db::DbResult<Self> {
                use autorent_core::db::sqlite::map_sqlx_error as $map;
                $body
            }
        }
    };

    ( $type:ty, |$row:ident, $map:ident, $ts:ident| $body:block ) => {
        #[cfg(feature = "postgres")]
        impl TryFrom<sqlx::postgres::PgRow> for $type {
            type Error = autorent_core::db::DbError;

            fn try_from($row: sqlx::postgres::PgRow) -> autorent_core::db::DbResult<Self> {
                use autorent_core::db::postgres::map_sqlx_error as $map;
                use autorent_core::db::postgres::get_timestamp as $ts;
                $body
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        impl TryFrom<sqlx::sqlite::SqliteRow> for $type {
            type Error = autorent_core::db::DbError;

            fn try_from($row: sqlx::sqlite::SqliteRow) -> autorent_core::db::DbResult<Self> {
                use autorent_core::db::sqlite::map_sqlx_error as $map;
                use autorent_core::db::sqlite::get_timestamp as $ts;
                $body
            }
        }
    };
];

mod bookings;
pub use bookings::*;
mod cars;
pub use cars::*;
mod messages;
pub use messages::*;
mod payments;
pub use payments::*;
mod promotions;
pub use promotions::*;
mod reviews;
pub use reviews::*;
mod users;
pub use users::*;

#[cfg(test)]
mod tests;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Checks that a write query touched exactly one row.
fn expect_one_row(rows_affected: u64) -> DbResult<()> {
    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        n => Err(DbError::BackendError(format!(
            "Expected to affect one row but affected {}",
            n
        ))),
    }
}
