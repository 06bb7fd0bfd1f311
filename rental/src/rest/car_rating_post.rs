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

//! API to recompute the average rating of a car from its reviews.

use crate::driver::Driver;
use crate::model::CarRegistration;
use crate::rest::httputils::Caller;
use autorent_core::rest::{EmptyBody, RestError};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message returned by the server after recomputing a rating.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct RatingResponse {
    /// The new average rating, or none if the car has no reviews.
    pub(crate) average_rating: Option<f64>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(registration): Path<CarRegistration>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let average_rating = driver.recompute_car_rating(&caller, &registration).await?;
    Ok(Json(RatingResponse { average_rating }))
}
