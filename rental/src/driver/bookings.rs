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

//! Extends the driver with the lifecycle of bookings.

use crate::db;
use crate::driver::cars::refresh_car_rating;
use crate::driver::payments::settle_status;
use crate::driver::{
    find_booking, find_customer, find_promotion, find_visible_car, require_self_or_staff,
    require_staff, Driver,
};
use crate::model::{
    Booking, BookingId, BookingRequest, BookingStatus, Cents, ClassifiedBookings, UserId,
};
use crate::pricing;
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Books a car for `caller` as described by `request`.
    pub(crate) async fn create_booking(
        self,
        caller: &UserId,
        request: BookingRequest,
    ) -> DriverResult<Booking> {
        let days = request.days()?;
        if request.pickup_location.trim().is_empty() || request.dropoff_location.trim().is_empty()
        {
            return Err(DriverError::InvalidInput(
                "Pickup and dropoff locations are required".to_owned(),
            ));
        }

        let mut tx = self.db.begin().await?;
        let today = self.clock.today();

        let customer = find_customer(&mut tx, caller).await?;
        if !customer.license_valid_through(request.end_date) {
            return Err(DriverError::InvalidInput(format!(
                "Driving license expires on {}, before the end of the booking",
                customer.license_expiry
            )));
        }

        let car = find_visible_car(&mut tx, &request.car).await?;
        if !car.available {
            return Err(DriverError::InvalidInput(format!(
                "Car {} is not available for booking",
                car.registration
            )));
        }
        if car.is_premium() && !customer.golden_member {
            return Err(DriverError::Unauthorized(format!(
                "Car {} can only be booked by golden members",
                car.registration
            )));
        }

        if request.start_date < today {
            return Err(DriverError::InvalidInput(format!(
                "Cannot book starting on {}, which is in the past",
                request.start_date
            )));
        }

        let overlapping = db::count_overlapping_bookings(
            tx.ex(),
            &car.registration,
            request.start_date,
            request.end_date,
        )
        .await?;
        if overlapping > 0 {
            return Err(DriverError::AlreadyExists(format!(
                "Car {} is already booked for some of the requested days",
                car.registration
            )));
        }

        let percent = match request.promotion_id {
            None => None,
            Some(id) => {
                if !customer.redeemed_promotions.contains(&id) {
                    return Err(DriverError::InvalidInput(format!(
                        "Promotion {} has not been redeemed or was already used",
                        id
                    )));
                }
                let promotion = find_promotion(&mut tx, id).await?;
                if !promotion.is_visible_to(customer.golden_member, today) {
                    return Err(DriverError::InvalidInput(format!(
                        "Promotion {} is not active",
                        id
                    )));
                }
                if !promotion.applies_to(&car) {
                    return Err(DriverError::InvalidInput(format!(
                        "Promotion {} does not apply to car {}",
                        id, car.registration
                    )));
                }
                if promotion.is_consumed_on_use() {
                    db::mark_promotion_used(tx.ex(), caller, id).await?;
                }
                promotion.discount_percent()?
            }
        };

        let quote = pricing::quote(car.price_per_day, days, &request.extras, percent)?;

        let id = BookingId::generate();
        let status = if quote.total == Cents::ZERO {
            settle_status(id, BookingStatus::Pending, Cents::ZERO, quote.total)
        } else {
            BookingStatus::Pending
        };

        let booking = Booking {
            id,
            user_id: caller.clone(),
            car: car.registration,
            start_date: request.start_date,
            end_date: request.end_date,
            extras: request.extras,
            promotion_id: request.promotion_id,
            total_cost: quote.total,
            paid: Cents::ZERO,
            status,
            pickup_location: request.pickup_location,
            dropoff_location: request.dropoff_location,
            created: self.clock.now_utc(),
            review_id: None,
        };
        db::insert_booking(tx.ex(), &booking).await?;
        tx.commit().await?;

        info!(
            "Booked car {} for {} from {} to {}",
            booking.car,
            caller.as_str(),
            booking.start_date,
            booking.end_date
        );
        Ok(booking)
    }

    /// Gets the booking `id`, which must belong to `caller` unless they are staff.
    pub(crate) async fn get_booking(self, caller: &UserId, id: BookingId) -> DriverResult<Booking> {
        let mut tx = self.db.begin().await?;
        let booking = find_booking(&mut tx, id).await?;
        require_self_or_staff(&mut tx, caller, &booking.user_id).await?;
        tx.commit().await?;
        Ok(booking)
    }

    /// Lists the bookings of `user_id` grouped by their position relative to today.
    pub(crate) async fn list_user_bookings(
        self,
        caller: &UserId,
        user_id: &UserId,
    ) -> DriverResult<ClassifiedBookings> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        let bookings = db::get_user_bookings(tx.ex(), user_id).await?;
        tx.commit().await?;
        Ok(ClassifiedBookings::classify(bookings, self.clock.today()))
    }

    /// Cancels the booking `id` on behalf of its owner `caller`.
    pub(crate) async fn cancel_booking(self, caller: &UserId, id: BookingId) -> DriverResult<Booking> {
        let mut tx = self.db.begin().await?;

        let mut booking = find_booking(&mut tx, id).await?;
        if &booking.user_id != caller {
            return Err(DriverError::Unauthorized(
                "Only the customer who made the booking can cancel it".to_owned(),
            ));
        }
        match booking.status {
            BookingStatus::Completed => {
                return Err(DriverError::InvalidInput(
                    "Cannot cancel a completed booking".to_owned(),
                ));
            }
            BookingStatus::Cancelled => {
                return Err(DriverError::InvalidInput("Booking is already cancelled".to_owned()));
            }
            BookingStatus::Pending | BookingStatus::InProgress => (),
        }

        booking.status = BookingStatus::Cancelled;
        db::set_booking_status(tx.ex(), id, booking.status).await?;
        tx.commit().await?;

        info!("Booking {} cancelled by its owner", id);
        Ok(booking)
    }

    /// Deletes the booking `id` together with its review and payments.
    pub(crate) async fn delete_booking(self, caller: &UserId, id: BookingId) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        require_staff(&mut tx, caller).await?;

        let booking = find_booking(&mut tx, id).await?;
        db::delete_booking(tx.ex(), id).await?;
        refresh_car_rating(&mut tx, &booking.car).await?;
        tx.commit().await?;

        info!("Booking {} deleted by {}", id, caller.as_str());
        Ok(())
    }
}
