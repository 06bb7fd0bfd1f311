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

//! API to price a hypothetical booking.

use crate::driver::Driver;
use crate::model::{CarRegistration, Extras, PromotionId};
use autorent_core::rest::RestError;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use time::Date;

/// Message sent to the server to request a quote.
#[derive(Deserialize, Serialize)]
pub(crate) struct QuoteRequest {
    /// Car to price.
    pub(crate) car: CarRegistration,

    /// First day of the rental.
    pub(crate) start_date: Date,

    /// Day on which the car would be returned.
    pub(crate) end_date: Date,

    /// Optional services to include.
    #[serde(default)]
    pub(crate) extras: Extras,

    /// Promotion whose discount to preview.
    #[serde(default)]
    pub(crate) promotion_id: Option<PromotionId>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, RestError> {
    let quote = driver
        .quote(
            &request.car,
            request.start_date,
            request.end_date,
            request.extras,
            request.promotion_id,
        )
        .await?;
    Ok(Json(quote))
}
