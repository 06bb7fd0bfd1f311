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

//! Utilities to identify the caller of an API.

use crate::model::UserId;
use async_trait::async_trait;
use autorent_core::rest::{get_unique_header_str, RestError, RestResult};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Name of the header in which the authentication gateway passes the identity of the caller.
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

/// Extracts the identity of the caller from the `headers` set by the authentication gateway.
fn get_caller(headers: &HeaderMap) -> RestResult<UserId> {
    let value = get_unique_header_str(headers, USER_ID_HEADER)?.ok_or_else(|| {
        RestError::Unauthorized(format!("Missing {} header", USER_ID_HEADER))
    })?;
    Ok(UserId::new(value)?)
}

/// The authenticated user issuing a request.
pub(crate) struct Caller(pub(crate) UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        get_caller(&parts.headers).map(Caller)
    }
}
