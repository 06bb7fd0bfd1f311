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

//! Entry point to the car rental service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use autorent::db::init_schema;
use autorent::driver::RentalOptions;
use autorent::serve;
use autorent_core::db::postgres::{PostgresDb, PostgresOptions};
use autorent_core::db::Db;
use autorent_core::env::get_optional_var;
use autorent_payments::webhook::WebhookOptions;
use autorent_payments::{StripeGateway, StripeOptions};
use std::net::Ipv4Addr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = get_optional_var::<u16>("", "PORT").unwrap().unwrap_or(3000);
    let addr = (Ipv4Addr::UNSPECIFIED, port);

    let db_opts = PostgresOptions::from_env("PGSQL_PROD").unwrap();
    let db = Arc::from(PostgresDb::connect(db_opts).unwrap());
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();

    let gateway = Arc::from(StripeGateway::new(StripeOptions::from_env("STRIPE").unwrap()));
    let opts = RentalOptions::from_env("RENTAL").unwrap();
    let webhook_opts = WebhookOptions::from_env("WEBHOOK").unwrap();

    serve(addr, db, gateway, opts, webhook_opts).await.unwrap()
}
