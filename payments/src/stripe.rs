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

//! Payment gateway implementation backed by Stripe Checkout.

use crate::{CheckoutRequest, CheckoutSession, PaymentGateway, PaymentsResult};
use async_trait::async_trait;
use autorent_core::env::{get_optional_var, get_required_var};
use bytes::Buf;
use derivative::Derivative;
use log::info;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::io;
use std::sync::Arc;
use url::Url;

/// Default base URL of the Stripe API.
const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Default currency for the checkouts.
const DEFAULT_CURRENCY: &str = "usd";

/// Converts a `reqwest::Error` to an `io::Error`.
fn reqwest_error_to_io_error(e: reqwest::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}", e))
}

/// Converts a `reqwest::Response` to an `io::Error`.  The response should have a non-OK status.
async fn http_response_to_io_error(response: Response) -> io::Error {
    let status = response.status();

    let kind = match status {
        StatusCode::OK => panic!("Should not have been called on a successful request"),

        // Match against the codes Stripe documents for its API.
        StatusCode::BAD_REQUEST => io::ErrorKind::InvalidInput,
        StatusCode::UNAUTHORIZED => io::ErrorKind::PermissionDenied,
        StatusCode::PAYMENT_REQUIRED => io::ErrorKind::InvalidInput,
        StatusCode::FORBIDDEN => io::ErrorKind::PermissionDenied,
        StatusCode::NOT_FOUND => io::ErrorKind::NotFound,
        StatusCode::TOO_MANY_REQUESTS => io::ErrorKind::ConnectionRefused,

        _ => io::ErrorKind::Other,
    };

    match response.text().await {
        Ok(text) => io::Error::new(
            kind,
            format!("HTTP request returned status {} with text '{}'", status, text),
        ),
        Err(e) => io::Error::new(
            kind,
            format!("HTTP request returned status {} and failed to get text due to {}", status, e),
        ),
    }
}

/// Subset of the checkout session object returned by Stripe that we care about.
#[derive(Deserialize)]
struct SessionResponse {
    /// Identifier of the session.
    id: String,

    /// URL of the hosted checkout page.  Only present while the session is open.
    url: Option<String>,
}

/// Options to configure a `StripeGateway`.
#[derive(Derivative)]
#[derivative(Debug)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct StripeOptions {
    /// Secret API key of the Stripe account.
    #[derivative(Debug = "ignore")]
    pub secret_key: String,

    /// URL where Stripe redirects the customer after a successful payment.
    pub success_url: Url,

    /// URL where Stripe redirects the customer after abandoning the payment.
    pub cancel_url: Url,

    /// Three-letter ISO code of the currency to charge in, in lowercase.
    pub currency: String,

    /// Base URL of the Stripe API.  Only overridden in tests.
    pub api_base: String,
}

/// Parses the `raw` value of the variable `name` as a URL.
fn parse_url(name: &str, raw: String) -> Result<Url, String> {
    Url::parse(&raw).map_err(|e| format!("Invalid URL in environment variable {}: {}", name, e))
}

impl StripeOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_SECRET_KEY`, `<prefix>_SUCCESS_URL`,
    /// `<prefix>_CANCEL_URL`, `<prefix>_CURRENCY` and `<prefix>_API_BASE`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let success_url = get_required_var::<String>(prefix, "SUCCESS_URL")?;
        let cancel_url = get_required_var::<String>(prefix, "CANCEL_URL")?;
        Ok(Self {
            secret_key: get_required_var::<String>(prefix, "SECRET_KEY")?,
            success_url: parse_url(&format!("{}_SUCCESS_URL", prefix), success_url)?,
            cancel_url: parse_url(&format!("{}_CANCEL_URL", prefix), cancel_url)?,
            currency: get_optional_var::<String>(prefix, "CURRENCY")?
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            api_base: get_optional_var::<String>(prefix, "API_BASE")?
                .unwrap_or_else(|| DEFAULT_API_BASE.to_owned()),
        })
    }
}

/// Payment gateway that creates Stripe Checkout sessions.
#[derive(Clone)]
pub struct StripeGateway {
    /// Asynchronous HTTP client with which to issue the service requests.
    client: Client,

    /// Configuration for the gateway.
    opts: Arc<StripeOptions>,
}

impl StripeGateway {
    /// Creates a new Stripe-backed gateway using `opts` for configuration.
    pub fn new(opts: StripeOptions) -> Self {
        Self { client: Client::default(), opts: Arc::from(opts) }
    }

    /// Builds the form parameters for the checkout session creation request.
    fn form_params(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_owned()),
            ("success_url", self.opts.success_url.to_string()),
            ("cancel_url", self.opts.cancel_url.to_string()),
            ("client_reference_id", request.reference.clone()),
            ("line_items[0][quantity]", "1".to_owned()),
            ("line_items[0][price_data][currency]", self.opts.currency.clone()),
            ("line_items[0][price_data][unit_amount]", request.amount.to_string()),
            ("line_items[0][price_data][product_data][name]", request.description.clone()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout(&self, request: &CheckoutRequest) -> PaymentsResult<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions", self.opts.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.opts.secret_key)
            .form(&self.form_params(request))
            .send()
            .await
            .map_err(reqwest_error_to_io_error)?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await.map_err(reqwest_error_to_io_error)?;
                let session: SessionResponse = serde_json::from_reader(bytes.reader())?;
                let url = session.url.ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Checkout session {} has no URL", session.id),
                    )
                })?;
                info!("Created checkout session {} for {}", session.id, request.reference);
                Ok(CheckoutSession { external_id: session.id, url })
            }
            _ => Err(http_response_to_io_error(response).await),
        }
    }
}
