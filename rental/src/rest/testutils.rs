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

//! Test utilities for the REST API.

use crate::driver::testutils::TestContext as DriverTestContext;
use crate::model::UserId;
use crate::rest::app;
pub(crate) use crate::rest::httputils::USER_ID_HEADER;
use autorent_core::clocks::Clock;
use autorent_core::rest::testutils::OneShotBuilder;
use autorent_payments::webhook::{self, WebhookOptions};
use axum::http;
use axum::Router;
use std::ops::Deref;
use std::time::Duration;

/// Secret used to sign webhook events in tests.
pub(crate) const WEBHOOK_SECRET: &str = "whsec_test";

/// State of a running test.
///
/// This wraps the driver's test context, which gives direct access to the database, the clock
/// and the payment processor, and adds the router under test.
pub(crate) struct TestContext {
    /// Context of the underlying driver.
    inner: DriverTestContext,

    /// The router under test.
    app: Router,
}

impl TestContext {
    /// Initializes the REST app on top of a test driver.
    pub(crate) async fn setup() -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let inner = DriverTestContext::setup().await;
        let webhook_opts = WebhookOptions {
            secret: WEBHOOK_SECRET.to_owned(),
            tolerance: Duration::from_secs(5 * 60),
        };
        let app = app(inner.driver(), webhook_opts);
        Self { inner, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Starts a request to `route` issued by `caller`.
    pub(crate) fn request_as<U: AsRef<str>>(
        &self,
        caller: &UserId,
        route: (http::Method, U),
    ) -> OneShotBuilder {
        OneShotBuilder::new(self.app(), route).with_header(USER_ID_HEADER, caller.as_str())
    }

    /// Computes a valid signature header for a webhook delivered now with `body`.
    pub(crate) fn sign_webhook(&self, body: &[u8]) -> String {
        webhook::sign(WEBHOOK_SECRET, self.clock.now_utc().unix_timestamp(), body)
    }
}

impl Deref for TestContext {
    type Target = DriverTestContext;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
