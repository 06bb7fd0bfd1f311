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

//! Promotions offered to customers.

use crate::model::{Car, Percent, PromotionId};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::Date;

/// What a promotion grants.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionKind {
    /// One-off percentage discount.
    Discount,

    /// Non-monetary offer described in the text.
    Offer,

    /// Free upgrade to a better car.
    Upgrade,

    /// Percentage discount that is not consumed when used.
    Permanent,
}

impl PromotionKind {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            PromotionKind::Discount => "discount",
            PromotionKind::Offer => "offer",
            PromotionKind::Upgrade => "upgrade",
            PromotionKind::Permanent => "permanent",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "discount" => Ok(PromotionKind::Discount),
            "offer" => Ok(PromotionKind::Offer),
            "upgrade" => Ok(PromotionKind::Upgrade),
            "permanent" => Ok(PromotionKind::Permanent),
            s => Err(ModelError(format!("Unknown promotion kind '{}'", s))),
        }
    }

    /// Returns true if promotions of this kind carry a percentage discount.
    pub fn is_percentage(self) -> bool {
        matches!(self, PromotionKind::Discount | PromotionKind::Permanent)
    }
}

/// Which customers and cars a promotion targets.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Every car.
    All,

    /// Only the cars listed in the targets.
    Specific,

    /// Nobody.  Used to park a promotion without deleting it.
    None,
}

impl Audience {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Specific => "specific",
            Audience::None => "none",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "all" => Ok(Audience::All),
            "specific" => Ok(Audience::Specific),
            "none" => Ok(Audience::None),
            s => Err(ModelError(format!("Unknown promotion audience '{}'", s))),
        }
    }
}

/// Details of a promotion as provided by staff when creating it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NewPromotion {
    /// Short headline.
    pub title: String,

    /// Longer explanation.
    #[serde(default)]
    pub description: String,

    /// Banner image.
    #[serde(default)]
    pub image_url: Option<String>,

    /// What the promotion grants.
    pub kind: PromotionKind,

    /// Percentage for discount-like promotions.
    #[serde(default)]
    pub value: Option<i64>,

    /// First day on which the promotion can be used.
    pub valid_from: Date,

    /// Last day on which the promotion can be used.
    pub valid_until: Date,

    /// Which cars the promotion applies to.
    pub audience: Audience,

    /// Car registrations or category tags, for the `specific` audience.
    #[serde(default)]
    pub targets: Vec<String>,

    /// Whether only golden members can see the promotion.
    #[serde(default)]
    pub golden_only: bool,
}

impl NewPromotion {
    /// Validates the details and turns them into a promotion with identifier `id`.
    pub fn into_promotion(self, id: PromotionId) -> ModelResult<Promotion> {
        if self.title.trim().is_empty() {
            return Err(ModelError("Promotion title cannot be empty".to_owned()));
        }
        if self.valid_from > self.valid_until {
            return Err(ModelError(format!(
                "Promotion validity starts on {} after it ends on {}",
                self.valid_from, self.valid_until
            )));
        }
        if self.kind.is_percentage() {
            match self.value {
                Some(value) => {
                    Percent::new(value)?;
                }
                None => {
                    return Err(ModelError(format!(
                        "A {} promotion needs a percentage value",
                        self.kind.as_str()
                    )))
                }
            }
        }
        if self.audience == Audience::Specific && self.targets.is_empty() {
            return Err(ModelError("A specific promotion needs at least one target".to_owned()));
        }

        Ok(Promotion {
            id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            kind: self.kind,
            value: self.value,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            audience: self.audience,
            targets: self.targets,
            golden_only: self.golden_only,
        })
    }
}

/// A promotion that customers can redeem and later apply to a booking.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Promotion {
    /// Identifier of the promotion.
    pub id: PromotionId,

    /// Short headline.
    pub title: String,

    /// Longer explanation.
    pub description: String,

    /// Banner image.
    pub image_url: Option<String>,

    /// What the promotion grants.
    pub kind: PromotionKind,

    /// Percentage for discount-like promotions.
    pub value: Option<i64>,

    /// First day on which the promotion can be used.
    pub valid_from: Date,

    /// Last day on which the promotion can be used.
    pub valid_until: Date,

    /// Which cars the promotion applies to.
    pub audience: Audience,

    /// Car registrations or category tags, for the `specific` audience.
    pub targets: Vec<String>,

    /// Whether only golden members can see the promotion.
    pub golden_only: bool,
}

impl Promotion {
    /// Returns true if `today` falls within the validity window.
    pub fn is_active(&self, today: Date) -> bool {
        self.valid_from <= today && today <= self.valid_until
    }

    /// Returns true if a customer with the given `golden` membership can see the promotion.
    pub fn is_visible_to(&self, golden: bool, today: Date) -> bool {
        self.is_active(today) && self.audience != Audience::None && (golden || !self.golden_only)
    }

    /// Returns true if the promotion can be applied to a booking of `car`.
    pub fn applies_to(&self, car: &Car) -> bool {
        match self.audience {
            Audience::All => true,
            Audience::None => false,
            Audience::Specific => self.targets.iter().any(|target| {
                target.eq_ignore_ascii_case(car.registration.as_str()) || car.has_category(target)
            }),
        }
    }

    /// Returns the discount percentage that the promotion contributes to a quote, if any.
    pub fn discount_percent(&self) -> ModelResult<Option<Percent>> {
        if !self.kind.is_percentage() {
            return Ok(None);
        }
        match self.value {
            Some(value) => Ok(Some(Percent::new(value)?)),
            None => Err(ModelError(format!("Promotion {} has no percentage", self.id))),
        }
    }

    /// Returns true if applying the promotion to a booking consumes it.
    pub fn is_consumed_on_use(&self) -> bool {
        self.kind != PromotionKind::Permanent
    }
}

/// Outcome of redeeming a promotion.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemStatus {
    /// The customer had already redeemed the promotion.  Nothing changed.
    AlreadyRedeemed,

    /// The promotion was added to the customer's redeemed list.
    Success,
}
