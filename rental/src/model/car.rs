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

//! Cars of the fleet.

use crate::model::Cents;
use autorent_core::model::{ModelError, ModelResult};
use serde::{de::Visitor, Deserialize, Serialize};

/// Category tag that restricts a car to golden members.
const PREMIUM_CATEGORY: &str = "premium";

/// Minimum length of a registration plate.
const MIN_REGISTRATION_LENGTH: usize = 2;

/// Maximum length of a registration plate as specified in the schema.
const MAX_REGISTRATION_LENGTH: usize = 16;

/// Registration plate of a car, which acts as its natural key.
///
/// Plates are case-insensitive so we force them to uppercase.
#[derive(Clone, Debug, derive_more::Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CarRegistration(String);

impl CarRegistration {
    /// Creates a new registration from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() < MIN_REGISTRATION_LENGTH {
            return Err(ModelError(format!("Registration '{}' is too short", s)));
        }
        if s.len() > MAX_REGISTRATION_LENGTH {
            return Err(ModelError(format!("Registration '{}' is too long", s)));
        }
        if let Some(ch) = s.chars().find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-')) {
            return Err(ModelError(format!(
                "Unsupported character '{}' in registration '{}'",
                ch, s
            )));
        }

        Ok(Self(s.to_uppercase()))
    }

    /// Returns a string view of the registration.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for CarRegistration {
    /// Creates a new registration from a hardcoded string, which must be valid.
    fn from(s: &'static str) -> Self {
        CarRegistration::new(s).expect("Hardcoded registrations must be valid")
    }
}

/// A deserialization visitor for a `CarRegistration`.
struct CarRegistrationVisitor;

impl Visitor<'_> for CarRegistrationVisitor {
    type Value = CarRegistration;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        CarRegistration::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        CarRegistration::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for CarRegistration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(CarRegistrationVisitor)
    }
}

/// A car of the fleet.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Car {
    /// Registration plate.
    pub registration: CarRegistration,

    /// Manufacturer.
    pub make: String,

    /// Model name.
    pub model: String,

    /// Trim level.
    #[serde(default)]
    pub trim: String,

    /// Model year.
    pub year: i32,

    /// Exterior color.
    #[serde(default)]
    pub color: String,

    /// Whether the car can currently be booked.
    #[serde(default = "default_true")]
    pub available: bool,

    /// Whether the car has been withdrawn from the fleet.  Disabled cars are invisible.
    #[serde(default)]
    pub disabled: bool,

    /// Base rental price per day.
    pub price_per_day: Cents,

    /// URLs of the pictures of the car.
    #[serde(default)]
    pub pictures: Vec<String>,

    /// Free-form tags such as `suv` or `premium`, in lowercase.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Mean rating of the reviews of the car's bookings, if there are any.
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// Helper for serde defaults.
fn default_true() -> bool {
    true
}

impl Car {
    /// Lowercases and deduplicates the categories and checks the descriptive fields.
    pub fn normalize(mut self) -> ModelResult<Self> {
        if self.make.trim().is_empty() || self.model.trim().is_empty() {
            return Err(ModelError("Make and model cannot be empty".to_owned()));
        }

        let mut categories = Vec::with_capacity(self.categories.len());
        for category in self.categories {
            let category = category.trim().to_lowercase();
            if category.is_empty() {
                return Err(ModelError("Categories cannot be empty".to_owned()));
            }
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        self.categories = categories;
        Ok(self)
    }

    /// Returns true if the car is tagged with `category`, ignoring case.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Returns true if the car is reserved to golden members.
    pub fn is_premium(&self) -> bool {
        self.has_category(PREMIUM_CATEGORY)
    }
}

/// Changes that staff can apply to an existing car.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CarPatch {
    /// New availability, if changing.
    pub available: Option<bool>,

    /// New disabled state, if changing.
    pub disabled: Option<bool>,

    /// New price per day, if changing.
    pub price_per_day: Option<Cents>,
}

impl CarPatch {
    /// Applies the patch to `car`.
    pub fn apply(self, mut car: Car) -> Car {
        if let Some(available) = self.available {
            car.available = available;
        }
        if let Some(disabled) = self.disabled {
            car.disabled = disabled;
        }
        if let Some(price_per_day) = self.price_per_day {
            car.price_per_day = price_per_day;
        }
        car
    }
}

/// Criteria to list cars.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CarFilter {
    /// Only list cars tagged with this category.
    pub category: Option<String>,

    /// Also list cars that are not available for booking right now.
    #[serde(default)]
    pub include_unavailable: bool,
}

impl CarFilter {
    /// Returns true if `car` should be listed.
    pub fn matches(&self, car: &Car) -> bool {
        if car.disabled {
            return false;
        }
        if !car.available && !self.include_unavailable {
            return false;
        }
        match &self.category {
            Some(category) => car.has_category(category),
            None => true,
        }
    }
}
