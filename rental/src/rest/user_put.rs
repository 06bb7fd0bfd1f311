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

//! API to mirror the identity of a user from the authentication provider.

use crate::driver::Driver;
use crate::model::{EmailAddress, User, UserId};
use crate::rest::httputils::Caller;
use autorent_core::rest::RestError;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to create or update a user.
#[derive(Deserialize, Serialize)]
pub(crate) struct UserRequest {
    /// Display name of the user.
    pub(crate) name: String,

    /// Contact email of the user.
    pub(crate) email: EmailAddress,

    /// Whether the user belongs to the staff.
    #[serde(default)]
    pub(crate) is_staff: bool,
}

/// PUT handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(id): Path<UserId>,
    Json(request): Json<UserRequest>,
) -> Result<impl IntoResponse, RestError> {
    let user = User { id, name: request.name, email: request.email, is_staff: request.is_staff };
    let user = driver.upsert_user(&caller, user).await?;
    Ok(Json(user))
}
