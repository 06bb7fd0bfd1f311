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

//! Shared framework for the autorent services.
//!
//! Services built on this crate follow the same layered architecture and should define the same
//! modules:
//!
//! 1.  `model`: High-level data types that represent concepts of the domain.  Types validate
//!     their contents at construction time and contain no other logic.
//!
//! 1.  `db`: The persistence layer.  Services provide free functions that take an `Executor` and
//!     issue the queries for every supported database backend.
//!
//! 1.  `driver`: The business logic layer.  Services provide a `Driver` type that holds the
//!     injected dependencies (database, clock, external services) and runs every operation inside
//!     a single transaction.
//!
//! 1.  `rest`: The HTTP layer.  Services provide an `app` function that returns the
//!     `axum::Router` for the service, with one file per API.
//!
//! 1.  `main`: The launcher, which only gathers configuration from the environment and calls the
//!     service's `serve` function.
//!
//! Every layer has its own result and error types (`DbResult`, `DriverResult`, `RestResult`) and
//! errors float up with `?` until they are turned into HTTP status codes by the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
