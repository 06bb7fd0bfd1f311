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

//! API to add a car to the fleet.

use crate::driver::Driver;
use crate::model::Car;
use crate::rest::httputils::Caller;
use autorent_core::rest::{Created, RestError};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Json(car): Json<Car>,
) -> Result<impl IntoResponse, RestError> {
    let car = driver.add_car(&caller, car).await?;
    Ok(Created(car))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CarRegistration, Cents};
    use crate::rest::testutils::*;
    use autorent_core::test_payload_must_be_json;
    use axum::http;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/v1/cars".to_owned())
    }

    fn new_car(registration: &'static str) -> Car {
        Car {
            registration: CarRegistration::from(registration),
            make: "Mazda".to_owned(),
            model: "CX-5".to_owned(),
            trim: "Touring".to_owned(),
            year: 2024,
            color: "red".to_owned(),
            available: true,
            disabled: false,
            price_per_day: Cents::new(6500).unwrap(),
            pictures: vec!["https://example.com/cx5.jpg".to_owned()],
            categories: vec!["SUV".to_owned(), "suv".to_owned(), "Family".to_owned()],
            average_rating: Some(4.0),
        }
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;

        let response = context
            .request_as(&staff, route())
            .send_json(new_car("XY987"))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Car>()
            .await;
        assert_eq!(vec!["suv".to_owned(), "family".to_owned()], response.categories);
        assert_eq!(None, response.average_rating);
        assert_eq!(response, context.get_car(&CarRegistration::from("XY987")).await);
    }

    #[tokio::test]
    async fn test_duplicate() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;
        context.create_car("XY987", 1000, &[]).await;

        context
            .request_as(&staff, route())
            .send_json(new_car("XY987"))
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("Car XY987 already exists")
            .await;
    }

    #[tokio::test]
    async fn test_not_staff() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;

        context
            .request_as(&alice, route())
            .send_json(new_car("XY987"))
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Only staff")
            .await;
    }

    test_payload_must_be_json!(
        TestContext::setup().await.into_app(),
        route();
        USER_ID_HEADER => "staff"
    );
}
