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

//! Car rental service: fleet browsing, bookings, payments, promotions and memberships.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use autorent_core::clocks::SystemClock;
use autorent_core::db::Db;
use autorent_payments::webhook::WebhookOptions;
use autorent_payments::PaymentGateway;
use log::info;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub mod db;
pub mod driver;
use driver::{Driver, RentalOptions};
pub mod model;
pub(crate) mod pricing;
mod rest;
use rest::app;

/// Serves the rental APIs on `bind_addr` until the server fails.
///
/// Bookings and payments are stored in `db`, checkouts are created through `gateway`, and
/// webhook deliveries are authenticated with `webhook_opts`.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    gateway: Arc<dyn PaymentGateway + Send + Sync>,
    opts: RentalOptions,
    webhook_opts: WebhookOptions,
) -> Result<(), Box<dyn Error>> {
    let clock = Arc::from(SystemClock::default());
    let driver = Driver::new(db, clock, gateway, opts);
    let app = app(driver, webhook_opts).layer(CorsLayer::permissive());

    let bind_addr = bind_addr.into();
    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
