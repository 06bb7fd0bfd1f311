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

//! Error types shared by the business logic layer of the services.
//!
//! A service's `Driver` bundles its dependencies behind `Arc`s so that it is cheap to clone into
//! every request handler:
//!
//! ```rust
//! use autorent_core::clocks::Clock;
//! use autorent_core::db::Db;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! pub struct Driver {
//!     /// Persistence layer.
//!     db: Arc<dyn Db + Send + Sync>,
//!
//!     /// Source of the current time.
//!     clock: Arc<dyn Clock + Send + Sync>,
//! }
//! ```
//!
//! Operations take `self` by value and run inside one database transaction, which they commit
//! only once every step has succeeded.

use crate::db::DbError;
use crate::model::ModelError;

/// Errors produced by the business logic.
///
/// The message of every variant is meant to be shown to the API client as is.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// The operation would duplicate or contradict existing data.
    #[error("{0}")]
    AlreadyExists(String),

    /// The database or an external service failed.
    #[error("{0}")]
    BackendError(String),

    /// The input violates a business rule.
    #[error("{0}")]
    InvalidInput(String),

    /// The operation refers to an entity that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller lacks the rights for the operation.
    #[error("{0}")]
    Unauthorized(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        let message = e.to_string();
        match e {
            DbError::AlreadyExists => DriverError::AlreadyExists(message),
            DbError::NotFound => DriverError::NotFound(message),
            DbError::BackendError(_) | DbError::DataIntegrityError(_) | DbError::Unavailable => {
                DriverError::BackendError(message)
            }
        }
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::InvalidInput(e.0)
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;
