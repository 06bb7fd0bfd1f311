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

//! API to receive events from the payment processor.
//!
//! Events are authenticated with the signature header instead of the caller identity.  Any
//! failure to apply a legitimate event is reported as an internal error so that the processor
//! retries the delivery later.

use crate::driver::Driver;
use crate::model::Cents;
use autorent_core::rest::{get_unique_header_str, RestError};
use autorent_payments::webhook::{WebhookOptions, CHECKOUT_SESSION_COMPLETED, SIGNATURE_HEADER};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use log::{info, warn};
use std::sync::Arc;

/// POST handler for this API.
pub(crate) async fn handler(
    State((driver, opts)): State<(Driver, Arc<WebhookOptions>)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, RestError> {
    let signature = get_unique_header_str(&headers, SIGNATURE_HEADER)?.ok_or_else(|| {
        RestError::InvalidRequest(format!("Missing {} header", SIGNATURE_HEADER))
    })?;

    let event = match driver.verify_webhook(&opts, signature, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejected webhook delivery: {}", e);
            return Err(RestError::InvalidRequest(e.to_string()));
        }
    };

    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        info!("Ignoring webhook event {} of type {}", event.id, event.event_type);
        return Ok(());
    }

    let object = event.data.object;
    let amount = match object.amount_total {
        Some(amount) => Some(Cents::new(amount)?),
        None => None,
    };
    if let Err(e) = driver.handle_payment_succeeded(&object.id, amount).await {
        warn!("Failed to process webhook event {}: {}", event.id, e);
        return Err(RestError::InternalError(e.to_string()));
    }

    Ok(())
}
