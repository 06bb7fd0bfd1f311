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

//! SQLite backend, used by the unit tests of the services.
//!
//! SQLite has no timestamp type, so timestamps are stored as two integer columns named
//! `<column>_secs` and `<column>_nsecs`.  The helpers in this module convert between both
//! representations.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor};
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Row, Transaction};
use time::OffsetDateTime;

/// Number of nanoseconds in a second.
const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Converts a raw SQLx error `e` into a `DbError`.
///
/// SQLite reports constraint violations only through the error message, so those have to be
/// recognized by text.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => {
            let message = e.to_string();
            if message.contains("UNIQUE constraint failed") {
                DbError::AlreadyExists
            } else if message.contains("FOREIGN KEY constraint failed") {
                DbError::NotFound
            } else {
                DbError::BackendError(message)
            }
        }
    }
}

/// Executor for a SQLite database.
#[derive(Debug)]
pub enum SqliteExecutor {
    /// Pooled connection outside of any transaction.
    PoolExec(PoolConnection<Sqlite>),

    /// Open transaction.
    TxExec(Transaction<'static, Sqlite>),
}

impl SqliteExecutor {
    /// Returns the connection to pass to `sqlx` queries.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        match self {
            SqliteExecutor::PoolExec(conn) => &mut **conn,
            SqliteExecutor::TxExec(tx) => &mut **tx,
        }
    }

    /// Commits the transaction behind this executor.
    pub(super) async fn commit(self) -> DbResult<()> {
        match self {
            SqliteExecutor::PoolExec(_) => {
                Err(DbError::BackendError("Cannot commit outside of a transaction".to_owned()))
            }
            SqliteExecutor::TxExec(tx) => tx.commit().await.map_err(map_sqlx_error),
        }
    }
}

/// Database backed by a SQLite connection pool.
pub struct SqliteDb {
    /// The connection pool.
    pool: SqlitePool,
}

impl SqliteDb {
    /// Opens the database described by `conn_str`, such as `:memory:` or a file path.
    pub async fn connect(conn_str: &str) -> DbResult<Self> {
        let pool = SqlitePool::connect(conn_str).await.map_err(map_sqlx_error)?;
        Ok(Self { pool })
    }
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("SQLite pool dropped while still open; call close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Sqlite(SqliteExecutor::PoolExec(conn)))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(TxExecutor(Executor::Sqlite(SqliteExecutor::TxExec(tx))))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs all statements in `schema` against `ex`.
pub async fn run_schema(ex: &mut SqliteExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(ex.conn()).await.map_err(map_sqlx_error).map(|_| ())
}

/// Builds a timestamp from the seconds and nanoseconds read from the database.
///
/// Both quantities are signed because SQLite integers are, but negative values are rejected as
/// they would break the ordering of the rows.
pub fn join_timestamp(secs: i64, nsecs: i64) -> DbResult<OffsetDateTime> {
    if secs < 0 || !(0..1_000_000_000).contains(&nsecs) {
        return Err(DbError::DataIntegrityError(format!(
            "Invalid stored timestamp: secs={}, nsecs={}",
            secs, nsecs
        )));
    }

    let nanos = i128::from(secs) * NANOS_PER_SEC + i128::from(nsecs);
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .map_err(|e| DbError::DataIntegrityError(format!("Invalid stored timestamp: {}", e)))
}

/// Splits a timestamp into the seconds and nanoseconds to store in the database.
pub fn split_timestamp(ts: OffsetDateTime) -> DbResult<(i64, i64)> {
    let nanos = ts.unix_timestamp_nanos();
    if nanos < 0 {
        return Err(DbError::BackendError(format!("Cannot store timestamp {} before 1970", ts)));
    }
    let secs = i64::try_from(nanos / NANOS_PER_SEC)
        .map_err(|e| DbError::BackendError(format!("Timestamp {} too large: {}", ts, e)))?;
    let nsecs = (nanos % NANOS_PER_SEC) as i64;
    Ok((secs, nsecs))
}

/// Reads the timestamp stored in the `<column>_secs` and `<column>_nsecs` pair of `row`.
pub fn get_timestamp(row: &SqliteRow, column: &str) -> DbResult<OffsetDateTime> {
    let secs: i64 = row.try_get(format!("{}_secs", column).as_str()).map_err(map_sqlx_error)?;
    let nsecs: i64 = row.try_get(format!("{}_nsecs", column).as_str()).map_err(map_sqlx_error)?;
    join_timestamp(secs, nsecs)
}

/// Test utilities for the SQLite backend.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Opens a fresh in-memory database with logging configured for tests.
    pub async fn setup() -> SqliteDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        SqliteDb::connect(":memory:").await.unwrap()
    }
}
