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

//! Bookings and their lifecycle.

use crate::model::{BookingId, CarRegistration, Cents, PromotionId, ReviewId, UserId};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Lifecycle state of a booking.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created but not paid for at all.
    Pending,

    /// Partially paid.
    InProgress,

    /// Fully paid.
    Completed,

    /// Cancelled by the customer.
    Cancelled,
}

impl BookingStatus {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::InProgress => "inprogress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "inprogress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            s => Err(ModelError(format!("Unknown booking status '{}'", s))),
        }
    }

    /// Computes the status after a payment has been recorded, given the cumulative `paid` amount
    /// and the `total` cost of the booking.
    ///
    /// Only one step is taken per call so a booking never jumps from pending to completed.  Callers
    /// repeat the call until the status settles.
    pub fn after_payment(self, paid: Cents, total: Cents) -> Self {
        match self {
            BookingStatus::Pending => BookingStatus::InProgress,
            BookingStatus::InProgress if paid >= total => BookingStatus::Completed,
            status => status,
        }
    }
}

/// Optional services added to a booking.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Extras {
    /// Full insurance coverage.
    pub insurance: bool,

    /// Satellite navigation unit.
    pub gps: bool,

    /// Child seat.
    pub child_seat: bool,

    /// Driver provided by the company.
    pub chauffeur: bool,
}

/// Details provided by a customer to book a car.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BookingRequest {
    /// Car to book.
    pub car: CarRegistration,

    /// First day of the rental.
    pub start_date: Date,

    /// Day on which the car is returned, which is not charged for.
    pub end_date: Date,

    /// Optional services.
    #[serde(default)]
    pub extras: Extras,

    /// Redeemed promotion to apply, if any.
    #[serde(default)]
    pub promotion_id: Option<PromotionId>,

    /// Where the car is picked up.
    pub pickup_location: String,

    /// Where the car is returned.
    pub dropoff_location: String,
}

impl BookingRequest {
    /// Returns the number of charged days, validating that the window is not empty.
    pub fn days(&self) -> ModelResult<i64> {
        let days = (self.end_date - self.start_date).whole_days();
        if days < 1 {
            return Err(ModelError(format!(
                "End date {} must be after start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(days)
    }
}

/// A reservation of a car by a customer for a window of days.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Booking {
    /// Identifier of the booking.
    pub id: BookingId,

    /// Customer that made the booking.
    pub user_id: UserId,

    /// Booked car.
    pub car: CarRegistration,

    /// First day of the rental.
    pub start_date: Date,

    /// Day on which the car is returned.
    pub end_date: Date,

    /// Optional services.
    pub extras: Extras,

    /// Promotion applied to the booking, if any.
    pub promotion_id: Option<PromotionId>,

    /// Total cost of the booking after discounts.
    pub total_cost: Cents,

    /// Sum of all payments received so far.
    pub paid: Cents,

    /// Lifecycle state.
    pub status: BookingStatus,

    /// Where the car is picked up.
    pub pickup_location: String,

    /// Where the car is returned.
    pub dropoff_location: String,

    /// When the booking was made.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,

    /// Review left for this booking, if any.
    pub review_id: Option<ReviewId>,
}

/// Position of a booking relative to a given day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BookingPhase {
    /// The booking starts after the day.
    Upcoming,

    /// The day falls within the booking.
    Current,

    /// The booking ended before the day.
    Past,
}

impl Booking {
    /// Returns the number of charged days.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days()
    }

    /// Returns the amount that is still due.
    pub fn outstanding(&self) -> Cents {
        self.total_cost.saturating_sub(self.paid)
    }

    /// Classifies the booking with respect to `today`.
    ///
    /// The return day counts as current so that the booking stays visible until the car is back.
    pub fn phase(&self, today: Date) -> BookingPhase {
        if today < self.start_date {
            BookingPhase::Upcoming
        } else if today <= self.end_date {
            BookingPhase::Current
        } else {
            BookingPhase::Past
        }
    }
}

/// The bookings of a customer grouped for display.
#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ClassifiedBookings {
    /// Bookings that have not started yet.
    pub upcoming: Vec<Booking>,

    /// Bookings in progress today.
    pub current: Vec<Booking>,

    /// Bookings that already ended.
    pub past: Vec<Booking>,

    /// Cancelled bookings, regardless of their dates.
    pub cancelled: Vec<Booking>,
}

impl ClassifiedBookings {
    /// Splits `bookings` into groups as of `today`, preserving their relative order.
    pub fn classify(bookings: Vec<Booking>, today: Date) -> Self {
        let mut result = Self::default();
        for booking in bookings {
            if booking.status == BookingStatus::Cancelled {
                result.cancelled.push(booking);
                continue;
            }
            match booking.phase(today) {
                BookingPhase::Upcoming => result.upcoming.push(booking),
                BookingPhase::Current => result.current.push(booking),
                BookingPhase::Past => result.past.push(booking),
            }
        }
        result
    }
}
