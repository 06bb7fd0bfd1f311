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

//! APIs to collect payments through an external payment processor.
//!
//! Payments are collected via hosted checkout pages: the service asks the processor to create a
//! checkout session for an amount, sends the customer to the returned URL, and later learns about
//! the outcome via a signed webhook (see the `webhook` module).

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use async_trait::async_trait;
use std::io;

#[cfg(any(test, feature = "testutils"))]
mod mock;
#[cfg(any(test, feature = "testutils"))]
pub use mock::MockGateway;
mod stripe;
pub use stripe::{StripeGateway, StripeOptions};
pub mod webhook;

/// Result type for this module.
pub type PaymentsResult<T> = io::Result<T>;

/// Details of a checkout to create with the payment processor.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutRequest {
    /// Amount to collect, in cents.
    pub amount: i64,

    /// Human-readable description of what is being paid for, shown on the checkout page.
    pub description: String,

    /// Opaque identifier of the local entity this payment belongs to.
    pub reference: String,
}

/// A checkout session created by the payment processor.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutSession {
    /// Identifier assigned by the processor.  Webhook events refer to the session by this value.
    pub external_id: String,

    /// URL of the hosted checkout page where the customer completes the payment.
    pub url: String,
}

/// Interface to talk to a payment processor.
#[async_trait]
pub trait PaymentGateway {
    /// Creates a checkout session to collect the payment described by `request`.
    async fn create_checkout(&self, request: &CheckoutRequest) -> PaymentsResult<CheckoutSession>;
}
