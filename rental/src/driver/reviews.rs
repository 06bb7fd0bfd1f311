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

//! Extends the driver with the `submit_review` method.

use crate::db;
use crate::driver::cars::refresh_car_rating;
use crate::driver::{find_booking, Driver};
use crate::model::{BookingId, BookingStatus, Review, ReviewId, ReviewRequest, UserId};
use autorent_core::db::DbError;
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Records the review of booking `booking_id` written by `caller` and refreshes the average
    /// rating of the booked car.
    pub(crate) async fn submit_review(
        self,
        caller: &UserId,
        booking_id: BookingId,
        request: ReviewRequest,
    ) -> DriverResult<Review> {
        let mut tx = self.db.begin().await?;

        let booking = find_booking(&mut tx, booking_id).await?;
        if &booking.user_id != caller {
            return Err(DriverError::Unauthorized(
                "Only the customer who made the booking can review it".to_owned(),
            ));
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(DriverError::InvalidInput("Cannot review a cancelled booking".to_owned()));
        }
        if self.clock.today() < booking.start_date {
            return Err(DriverError::InvalidInput(format!(
                "Cannot review a booking before it starts on {}",
                booking.start_date
            )));
        }

        let review = Review {
            id: ReviewId::generate(),
            booking_id,
            user_id: caller.clone(),
            rating: request.rating,
            comment: request.comment.trim().to_owned(),
            created: self.clock.now_utc(),
        };
        match db::insert_review(tx.ex(), &review).await {
            Ok(()) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(format!(
                    "Booking {} has already been reviewed",
                    booking_id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let average = refresh_car_rating(&mut tx, &booking.car).await?;
        tx.commit().await?;

        info!("Car {} now has an average rating of {:?}", booking.car, average);
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::Rating;
    use time::macros::{date, datetime};

    fn request(stars: i64, comment: &str) -> ReviewRequest {
        ReviewRequest { rating: Rating::new(stars).unwrap(), comment: comment.to_owned() }
    }

    #[tokio::test]
    async fn test_submit_review_updates_average() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let bob = context.create_customer("bob").await;
        let car = context.create_car("AB123", 1000, &[]).await;
        let booking1 = context
            .insert_booking(&alice, &car, date!(2026 - 05 - 01), date!(2026 - 05 - 03), 2000)
            .await;
        let booking2 = context
            .insert_booking(&bob, &car, date!(2026 - 05 - 10), date!(2026 - 05 - 12), 2000)
            .await;

        let review =
            context.driver().submit_review(&alice, booking1.id, request(5, " Great! ")).await.unwrap();
        assert_eq!("Great!", review.comment);
        assert_eq!(TEST_NOW, review.created);
        assert_eq!(Some(5.0), context.get_car(&car.registration).await.average_rating);

        context.clock.advance(std::time::Duration::from_secs(60));
        context.driver().submit_review(&bob, booking2.id, request(2, "")).await.unwrap();
        assert_eq!(Some(3.5), context.get_car(&car.registration).await.average_rating);

        let reviews = context.driver().list_car_reviews(&car.registration).await.unwrap();
        assert_eq!(2, reviews.len());
        assert_eq!(review, reviews[0]);
    }

    #[tokio::test]
    async fn test_submit_review_twice_is_rejected() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let car = context.create_car("AB123", 1000, &[]).await;
        let booking = context
            .insert_booking(&alice, &car, date!(2026 - 05 - 01), date!(2026 - 05 - 03), 2000)
            .await;

        context.driver().submit_review(&alice, booking.id, request(4, "")).await.unwrap();
        match context.driver().submit_review(&alice, booking.id, request(1, "")).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("already been reviewed")),
            e => panic!("{:?}", e),
        }
        assert_eq!(Some(4.0), context.get_car(&car.registration).await.average_rating);
    }

    #[tokio::test]
    async fn test_submit_review_rules() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let bob = context.create_customer("bob").await;
        let car = context.create_car("AB123", 1000, &[]).await;
        let future = context
            .insert_booking(&alice, &car, date!(2026 - 06 - 10), date!(2026 - 06 - 12), 2000)
            .await;

        match context.driver().submit_review(&bob, future.id, request(3, "")).await {
            Err(DriverError::Unauthorized(msg)) => assert!(msg.contains("Only the customer")),
            e => panic!("{:?}", e),
        }

        match context.driver().submit_review(&alice, future.id, request(3, "")).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("before it starts")),
            e => panic!("{:?}", e),
        }

        context.clock.set(datetime!(2026-06-10 08:00:00 UTC));
        context.driver().submit_review(&alice, future.id, request(3, "")).await.unwrap();

        let cancelled = context
            .insert_booking(&alice, &car, date!(2026 - 06 - 01), date!(2026 - 06 - 02), 1000)
            .await;
        context.driver().cancel_booking(&alice, cancelled.id).await.unwrap();
        match context.driver().submit_review(&alice, cancelled.id, request(3, "")).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("cancelled")),
            e => panic!("{:?}", e),
        }

        match context.driver().submit_review(&alice, BookingId::generate(), request(3, "")).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
    }
}
