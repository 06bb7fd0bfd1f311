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

//! Reviews of completed rentals.

use crate::model::{BookingId, Rating, ReviewId, UserId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Details provided by a customer to review a booking.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReviewRequest {
    /// Number of stars.
    pub rating: Rating,

    /// Free-form text.
    #[serde(default)]
    pub comment: String,
}

/// A review of a booking, which feeds into the average rating of the booked car.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Review {
    /// Identifier of the review.
    pub id: ReviewId,

    /// Reviewed booking.
    pub booking_id: BookingId,

    /// Author of the review.
    pub user_id: UserId,

    /// Number of stars.
    pub rating: Rating,

    /// Free-form text.
    pub comment: String,

    /// When the review was written.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}
