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

//! API to replace the presentation settings of a user.

use crate::driver::Driver;
use crate::model::{UserId, UserSettings};
use crate::rest::httputils::Caller;
use autorent_core::rest::RestError;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(user): Path<UserId>,
    Json(settings): Json<UserSettings>,
) -> Result<impl IntoResponse, RestError> {
    let settings = driver.put_settings(&caller, &user, settings).await?;
    Ok(Json(settings))
}
