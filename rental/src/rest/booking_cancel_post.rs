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

//! API to cancel a booking.

use crate::driver::Driver;
use crate::model::BookingId;
use crate::rest::httputils::Caller;
use autorent_core::rest::{EmptyBody, RestError};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Caller(caller): Caller,
    Path(id): Path<BookingId>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let booking = driver.cancel_booking(&caller, id).await?;
    Ok(Json(booking))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Booking, BookingStatus};
    use crate::rest::testutils::*;
    use autorent_core::test_payload_must_be_empty;
    use axum::http;
    use time::macros::date;

    fn route(id: BookingId) -> (http::Method, String) {
        (http::Method::POST, format!("/api/v1/bookings/{}/cancel", id))
    }

    #[tokio::test]
    async fn test_ok_then_again() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let car = context.create_car("AB123", 3000, &[]).await;
        let booking = context
            .insert_booking(&alice, &car, date!(2026 - 06 - 05), date!(2026 - 06 - 06), 3000)
            .await;

        let response = context
            .request_as(&alice, route(booking.id))
            .send_empty()
            .await
            .expect_json::<Booking>()
            .await;
        assert_eq!(BookingStatus::Cancelled, response.status);
        assert_eq!(BookingStatus::Cancelled, context.get_booking(booking.id).await.status);

        context
            .request_as(&alice, route(booking.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("already cancelled")
            .await;
    }

    #[tokio::test]
    async fn test_staff_cannot_cancel() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let staff = context.create_staff("staff").await;
        let car = context.create_car("AB123", 3000, &[]).await;
        let booking = context
            .insert_booking(&alice, &car, date!(2026 - 06 - 05), date!(2026 - 06 - 06), 3000)
            .await;

        context
            .request_as(&staff, route(booking.id))
            .send_empty()
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Only the customer who made the booking")
            .await;
    }

    test_payload_must_be_empty!(
        TestContext::setup().await.into_app(),
        route(BookingId::generate());
        USER_ID_HEADER => "alice"
    );
}
