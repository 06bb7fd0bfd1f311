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

//! API to create or update the customer profile of a user.

use crate::driver::Driver;
use crate::model::{CustomerProfile, UserId};
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
    Json(profile): Json<CustomerProfile>,
) -> Result<impl IntoResponse, RestError> {
    let customer = driver.put_customer(&caller, &user, profile).await?;
    Ok(Json(customer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;
    use crate::rest::testutils::*;
    use autorent_core::test_payload_must_be_json;
    use axum::http;
    use time::macros::date;

    fn route(user: &str) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/v1/users/{}/customer", user))
    }

    fn profile() -> CustomerProfile {
        CustomerProfile {
            phone: "555-0199".to_owned(),
            license_number: "X-42".to_owned(),
            license_expiry: date!(2031 - 03 - 15),
            address: "7 Oak Road".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;

        let response = context
            .request_as(&alice, route("alice"))
            .send_json(profile())
            .await
            .expect_json::<Customer>()
            .await;
        assert_eq!(Customer::new(alice.clone(), profile()), response);
        assert_eq!(response, context.get_customer(&alice).await);
    }

    #[tokio::test]
    async fn test_invalid_profile() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;

        let request = CustomerProfile { phone: "".to_owned(), ..profile() };
        context
            .request_as(&alice, route("alice"))
            .send_json(request)
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Phone")
            .await;
    }

    #[tokio::test]
    async fn test_other_user() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;
        context.create_user("bob", false).await;

        context
            .request_as(&alice, route("bob"))
            .send_json(profile())
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("user bob")
            .await;
    }

    test_payload_must_be_json!(
        TestContext::setup().await.into_app(),
        route("alice");
        USER_ID_HEADER => "alice"
    );
}
