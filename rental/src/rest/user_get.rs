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

//! API to get the details of a user.

use crate::driver::Driver;
use crate::model::UserId;
use crate::rest::httputils::Caller;
use autorent_core::rest::{EmptyBody, RestError};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(user): Path<UserId>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let user = driver.get_user(&caller, &user).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use crate::model::User;
    use crate::rest::testutils::*;
    use autorent_core::test_payload_must_be_empty;
    use axum::http;

    fn route(user: &str) -> (http::Method, String) {
        (http::Method::GET, format!("/api/v1/users/{}", user))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;

        let response = context
            .request_as(&alice, route("alice"))
            .send_empty()
            .await
            .expect_json::<User>()
            .await;
        assert_eq!(alice, response.id);
        assert_eq!("alice@example.com", response.email.as_str());
        assert!(!response.is_staff);
    }

    #[tokio::test]
    async fn test_other_user() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;
        context.create_user("bob", false).await;

        context
            .request_as(&alice, route("bob"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Cannot access data of user bob")
            .await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;

        context
            .request_as(&staff, route("ghost"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User ghost not found")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route("alice");
        USER_ID_HEADER => "alice"
    );
}
