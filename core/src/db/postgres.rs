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

//! PostgreSQL backend, used in production.

use crate::db::{Db, DbError, DbResult, Executor, TxExecutor};
use crate::env::{get_optional_var, get_required_var};
use async_trait::async_trait;
use derivative::Derivative;
use futures::Future;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{
    PgConnectOptions, PgConnection, PgDatabaseError, PgPool, PgPoolOptions, PgRow, Postgres,
};
use sqlx::{Row, Transaction};
use std::time::Duration;
use time::OffsetDateTime;

/// Default number of times to retry acquiring a connection while the database is unavailable.
const DEFAULT_MAX_RETRIES: u16 = 60;

/// Default time to wait for a free connection in the pool.
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound of the delay between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Converts a raw SQLx error `e` into a `DbError` based on the PostgreSQL error codes.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) => {
            let code = e.downcast_ref::<PgDatabaseError>().code();
            match code {
                "23503" => DbError::NotFound,
                "23505" => DbError::AlreadyExists,
                "53300" | "57P03" => DbError::Unavailable,
                code => DbError::BackendError(format!("PostgreSQL error {}: {}", code, e)),
            }
        }
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Connection settings for a PostgreSQL server.
#[derive(Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Server hostname.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Name of the database.
    pub database: String,

    /// Role to log in as.
    pub username: String,

    /// Password of the role.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// Connections to keep open even when idle.
    pub min_connections: Option<u32>,

    /// Maximum number of concurrent connections.
    pub max_connections: Option<u32>,

    /// Time to wait for a free connection before considering the database unavailable.
    pub acquire_timeout: Duration,

    /// Number of times to retry an operation while the database is unavailable.
    pub max_retries: u16,
}

impl PostgresOptions {
    /// Reads the settings from the environment variables that start with `prefix`.
    ///
    /// `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_DATABASE`, `<prefix>_USERNAME` and
    /// `<prefix>_PASSWORD` must be set.  `<prefix>_MIN_CONNECTIONS`, `<prefix>_MAX_CONNECTIONS`,
    /// `<prefix>_ACQUIRE_TIMEOUT` and `<prefix>_MAX_RETRIES` are optional.
    pub fn from_env(prefix: &str) -> Result<PostgresOptions, String> {
        Ok(PostgresOptions {
            host: get_required_var::<String>(prefix, "HOST")?,
            port: get_required_var::<u16>(prefix, "PORT")?,
            database: get_required_var::<String>(prefix, "DATABASE")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
            min_connections: get_optional_var::<u32>(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
            acquire_timeout: get_optional_var::<Duration>(prefix, "ACQUIRE_TIMEOUT")?
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
            max_retries: get_optional_var::<u16>(prefix, "MAX_RETRIES")?
                .unwrap_or(DEFAULT_MAX_RETRIES),
        })
    }

    /// Builds the pool options described by these settings.
    fn pool_options(&self) -> PgPoolOptions {
        let mut options = PgPoolOptions::new().acquire_timeout(self.acquire_timeout);
        if let Some(min) = self.min_connections {
            options = options.min_connections(min);
        }
        if let Some(max) = self.max_connections {
            options = options.max_connections(max);
        }
        options
    }

    /// Builds the connection options described by these settings.
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }
}

/// Executor for a PostgreSQL database.
#[derive(Debug)]
pub enum PostgresExecutor {
    /// Pooled connection outside of any transaction.
    PoolExec(PoolConnection<Postgres>),

    /// Open transaction.
    TxExec(Transaction<'static, Postgres>),
}

impl PostgresExecutor {
    /// Returns the connection to pass to `sqlx` queries.
    pub fn conn(&mut self) -> &mut PgConnection {
        match self {
            PostgresExecutor::PoolExec(conn) => &mut **conn,
            PostgresExecutor::TxExec(tx) => &mut **tx,
        }
    }

    /// Commits the transaction behind this executor.
    pub(super) async fn commit(self) -> DbResult<()> {
        match self {
            PostgresExecutor::PoolExec(_) => {
                Err(DbError::BackendError("Cannot commit outside of a transaction".to_owned()))
            }
            PostgresExecutor::TxExec(tx) => tx.commit().await.map_err(map_sqlx_error),
        }
    }
}

/// Randomized and growing delays between attempts to reach an unavailable database.
struct Backoff {
    /// Attempts left before giving up.
    remaining: u16,

    /// Delay to apply before the next attempt.
    delay: Duration,
}

impl Backoff {
    /// Starts a new backoff sequence that allows `retries` more attempts.
    fn new(retries: u16) -> Self {
        Self { remaining: retries, delay: Self::jitter(100, 900) }
    }

    /// Returns a random delay between `base` and `base + spread` milliseconds.
    fn jitter(base: u64, spread: u16) -> Duration {
        Duration::from_millis(base + u64::from(rand::random::<u16>() % spread))
    }

    /// Consumes one attempt and returns the delay to wait before it, or none if there are no
    /// attempts left.
    fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let delay = self.delay;
        if self.delay < MAX_RETRY_DELAY {
            self.delay += Self::jitter(0, 1000);
        }
        Some(delay)
    }
}

/// Runs `op` until it succeeds, fails with an error other than `DbError::Unavailable`, or the
/// attempts allowed by `max_retries` are exhausted.
async fn with_retries<Op, OpFut, T>(max_retries: u16, op: Op) -> DbResult<T>
where
    Op: Fn() -> OpFut,
    OpFut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut backoff = Backoff::new(max_retries);
    loop {
        match op().await.map_err(map_sqlx_error) {
            Err(DbError::Unavailable) => match backoff.next_delay() {
                Some(delay) => {
                    warn!(
                        "PostgreSQL unavailable; retrying in {}ms ({} attempts left)",
                        delay.as_millis(),
                        backoff.remaining
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(DbError::Unavailable),
            },
            result => return result,
        }
    }
}

/// Database backed by a PostgreSQL connection pool.
pub struct PostgresDb {
    /// The connection pool, which is shared by all concurrent operations.
    pool: PgPool,

    /// Number of times to retry acquiring connections.
    max_retries: u16,
}

impl PostgresDb {
    /// Sets up a connection pool for the server described by `opts`.
    ///
    /// Connections are established lazily so this does not contact the server.
    pub fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let pool = opts.pool_options().connect_lazy_with(opts.connect_options());
        Ok(Self { pool, max_retries: opts.max_retries })
    }

    /// Returns a pooled executor without wrapping it into the generic `Executor`.
    pub async fn typed_ex(&self) -> DbResult<PostgresExecutor> {
        let conn = with_retries(self.max_retries, || self.pool.acquire()).await?;
        Ok(PostgresExecutor::PoolExec(conn))
    }
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("PostgreSQL pool dropped while still open; call close() first");
        }
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        Ok(Executor::Postgres(self.typed_ex().await?))
    }

    async fn begin(&self) -> DbResult<TxExecutor> {
        let tx = with_retries(self.max_retries, || self.pool.begin()).await?;
        Ok(TxExecutor(Executor::Postgres(PostgresExecutor::TxExec(tx))))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs all statements in `schema` against `ex`.
pub async fn run_schema(ex: &mut PostgresExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(ex.conn()).await.map_err(map_sqlx_error).map(|_| ())
}

/// Reads the `TIMESTAMPTZ` stored in `column` of `row`.
pub fn get_timestamp(row: &PgRow, column: &str) -> DbResult<OffsetDateTime> {
    row.try_get(column).map_err(map_sqlx_error)
}

/// Test utilities for the PostgreSQL backend.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Connects to the test server configured in the `PGSQL_TEST_*` variables.
    ///
    /// Tables go into the session-private `pg_temp` schema so that they vanish when the test
    /// disconnects, which requires the pool to hold exactly one connection.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        opts.min_connections = Some(1);
        opts.max_connections = Some(1);
        let db = PostgresDb::connect(opts).unwrap();

        let mut ex = db.typed_ex().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(ex.conn()).await.unwrap();
        db
    }
}
