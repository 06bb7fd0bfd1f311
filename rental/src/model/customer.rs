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

//! Rental-specific profile of a user.

use crate::model::{PromotionId, UserId};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::Date;

/// Details that a user provides to be able to rent cars.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CustomerProfile {
    /// Contact phone number.
    pub phone: String,

    /// Number of the driving license.
    pub license_number: String,

    /// Last day on which the driving license is valid.
    pub license_expiry: Date,

    /// Postal address.
    pub address: String,
}

impl CustomerProfile {
    /// Checks that the mandatory fields are present.
    pub fn validate(&self) -> ModelResult<()> {
        if self.phone.trim().is_empty() {
            return Err(ModelError("Phone cannot be empty".to_owned()));
        }
        if self.license_number.trim().is_empty() {
            return Err(ModelError("License number cannot be empty".to_owned()));
        }
        Ok(())
    }
}

/// A user with a rental profile.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Customer {
    /// Identifier of the user this profile belongs to.
    pub user_id: UserId,

    /// Contact phone number.
    pub phone: String,

    /// Number of the driving license.
    pub license_number: String,

    /// Last day on which the driving license is valid.
    pub license_expiry: Date,

    /// Postal address.
    pub address: String,

    /// Loyalty points accumulated by completing bookings.
    pub reward_points: i64,

    /// Whether the customer holds an active golden membership.
    pub golden_member: bool,

    /// Name of the active subscription plan, if any.
    pub subscription_plan: Option<String>,

    /// Promotions redeemed by the customer and not used yet.
    pub redeemed_promotions: Vec<PromotionId>,

    /// Promotions already consumed by a booking.
    pub used_promotions: Vec<PromotionId>,
}

impl Customer {
    /// Creates a fresh customer for `user_id` with the given `profile`.
    pub fn new(user_id: UserId, profile: CustomerProfile) -> Self {
        Self {
            user_id,
            phone: profile.phone,
            license_number: profile.license_number,
            license_expiry: profile.license_expiry,
            address: profile.address,
            reward_points: 0,
            golden_member: false,
            subscription_plan: None,
            redeemed_promotions: vec![],
            used_promotions: vec![],
        }
    }

    /// Returns true if the driving license is valid on every day up to and including `date`.
    pub fn license_valid_through(&self, date: Date) -> bool {
        self.license_expiry >= date
    }

    /// Returns true if the customer has redeemed `id`, whether it was used afterwards or not.
    pub fn has_redeemed(&self, id: PromotionId) -> bool {
        self.redeemed_promotions.contains(&id) || self.used_promotions.contains(&id)
    }
}
