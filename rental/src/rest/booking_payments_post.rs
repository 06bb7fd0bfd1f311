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

//! API to start a payment towards a booking.

use crate::driver::Driver;
use crate::model::{BookingId, Cents};
use crate::rest::httputils::Caller;
use autorent_core::rest::{Created, RestError};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to start a payment.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct PaymentRequest {
    /// Amount to pay.  Defaults to the whole outstanding balance.
    #[serde(default)]
    pub(crate) amount: Option<Cents>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(id): Path<BookingId>,
    Json(request): Json<PaymentRequest>,
) -> Result<impl IntoResponse, RestError> {
    let session = driver.create_booking_payment(&caller, id, request.amount).await?;
    Ok(Created(session))
}
