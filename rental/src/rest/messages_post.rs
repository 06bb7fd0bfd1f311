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

//! API to post a message to the conversation of a customer.

use crate::driver::Driver;
use crate::model::{MessageBody, UserId};
use crate::rest::httputils::Caller;
use autorent_core::rest::{Created, RestError};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Message sent to the server to post to a conversation.
#[derive(Deserialize, Serialize)]
pub(crate) struct MessageRequest {
    /// Text to post.
    pub(crate) body: MessageBody,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(customer): Path<UserId>,
    Json(request): Json<MessageRequest>,
) -> Result<impl IntoResponse, RestError> {
    let message = driver.send_message(&caller, &customer, request.body).await?;
    Ok(Created(message))
}
