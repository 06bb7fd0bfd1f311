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

//! Bounded numeric quantities.

use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// An amount of money in cents.  Never negative.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Cents(i64);

impl Cents {
    /// The zero amount.
    pub const ZERO: Cents = Cents(0);

    /// Creates a new amount, making sure it is not negative.
    pub fn new(cents: i64) -> ModelResult<Self> {
        if cents < 0 {
            return Err(ModelError(format!("Amount cannot be negative: {}", cents)));
        }
        Ok(Self(cents))
    }

    /// Returns the amount in cents.
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Returns the amount left after subtracting `other`, or zero if `other` is larger.
    pub fn saturating_sub(self, other: Cents) -> Cents {
        Cents((self.0 - other.0).max(0))
    }
}

impl TryFrom<i64> for Cents {
    type Error = ModelError;

    fn try_from(value: i64) -> ModelResult<Self> {
        Cents::new(value)
    }
}

impl From<Cents> for i64 {
    fn from(value: Cents) -> Self {
        value.0
    }
}

/// The number of stars given in a review.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Creates a new rating, making sure it is within range.
    pub fn new(stars: i64) -> ModelResult<Self> {
        match u8::try_from(stars) {
            Ok(stars) if (1..=5).contains(&stars) => Ok(Self(stars)),
            _ => Err(ModelError(format!("Rating must be between 1 and 5; got {}", stars))),
        }
    }

    /// Returns the number of stars.
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ModelError;

    fn try_from(value: i64) -> ModelResult<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(value: Rating) -> Self {
        i64::from(value.0)
    }
}

/// A percentage applied as a discount.  Zero is not a useful discount so it is not allowed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Percent(u8);

impl Percent {
    /// Creates a new percentage, making sure it is within range.
    pub fn new(value: i64) -> ModelResult<Self> {
        match u8::try_from(value) {
            Ok(value) if (1..=100).contains(&value) => Ok(Self(value)),
            _ => Err(ModelError(format!("Percentage must be between 1 and 100; got {}", value))),
        }
    }

    /// Returns the percentage as an integer.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percent {
    type Error = ModelError;

    fn try_from(value: i64) -> ModelResult<Self> {
        Percent::new(value)
    }
}

impl From<Percent> for i64 {
    fn from(value: Percent) -> Self {
        i64::from(value.0)
    }
}
