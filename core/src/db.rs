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

//! Access to the supported database backends.
//!
//! Services run against PostgreSQL in production and against SQLite in unit tests.  Queries are
//! written once per backend: callers match on the `Executor` variant and hand the raw connection
//! to `sqlx`, which type-checks the bound parameters for that backend.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(any(feature = "sqlite", test))]
pub mod sqlite;

/// Errors reported by the database layer.
///
/// Only the conditions that callers react to get their own variant.  Anything else ends up in
/// `BackendError`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// A unique key already exists.
    #[error("Already exists")]
    AlreadyExists,

    /// Unexpected failure of the backend.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Stored data cannot be converted back into the model types.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// The row does not exist, or a foreign key points to a missing row.
    #[error("Entity not found")]
    NotFound,

    /// The backend cannot take more work right now.
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.0)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DataIntegrityError(format!("Invalid JSON column: {}", e))
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// Handle to issue queries against one of the backends.
pub enum Executor {
    /// PostgreSQL backend.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// SQLite backend.
    #[cfg(any(feature = "sqlite", test))]
    Sqlite(sqlite::SqliteExecutor),
}

/// Executor bound to an open transaction.
///
/// The transaction is rolled back when this is dropped without a call to `commit`.
pub struct TxExecutor(Executor);

impl TxExecutor {
    /// Gives access to the executor that runs queries within the transaction.
    pub fn ex(&mut self) -> &mut Executor {
        &mut self.0
    }

    /// Commits the transaction.
    pub async fn commit(self) -> DbResult<()> {
        match self.0 {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => ex.commit().await,

            #[cfg(any(feature = "sqlite", test))]
            Executor::Sqlite(ex) => ex.commit().await,
        }
    }
}

/// A connection pool to one of the backends.
#[async_trait]
pub trait Db {
    /// Returns an executor that runs each query on its own, outside of any transaction.
    async fn ex(&self) -> DbResult<Executor>;

    /// Opens a transaction.
    async fn begin(&self) -> DbResult<TxExecutor>;

    /// Closes all connections once in-flight queries complete.
    async fn close(&self);
}

/// Macros to run the same test functions against every backend.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Generates a `#[tokio::test]` named `$name` that calls `$module::$name` with the database
    /// returned by `$setup`.
    #[macro_export]
    macro_rules! generate_one_test {
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        };
    }

    pub use generate_one_test;

    /// Generates one test per `$name` in `$module` for the database returned by `$setup`.
    ///
    /// The optional leading attribute, such as `#[ignore]`, applies to every generated test.
    #[macro_export]
    macro_rules! generate_tests {
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $( $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]); )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $( $crate::db::testutils::generate_one_test!($name, $setup, $module); )+
        };
    }

    pub use generate_tests;
}
