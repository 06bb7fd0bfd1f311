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

//! Payments, payment sessions and subscriptions.

use crate::model::{BookingId, Cents, PaymentId, PaymentSessionId, SubscriptionId, UserId};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Name of the only subscription plan on offer.
pub const GOLDEN_PLAN: &str = "golden";

/// What a payment session pays for.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum PaymentPurpose {
    /// A full or partial payment of a booking.
    Booking(BookingId),

    /// The first payment of a subscription.
    Subscription(SubscriptionId),
}

/// State of a payment session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSessionStatus {
    /// Waiting for the customer to complete the checkout.
    Pending,

    /// The processor confirmed the payment.
    Paid,
}

impl PaymentSessionStatus {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentSessionStatus::Pending => "pending",
            PaymentSessionStatus::Paid => "paid",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "pending" => Ok(PaymentSessionStatus::Pending),
            "paid" => Ok(PaymentSessionStatus::Paid),
            s => Err(ModelError(format!("Unknown payment session status '{}'", s))),
        }
    }
}

/// A checkout opened with the payment processor.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PaymentSession {
    /// Our identifier of the session.
    pub id: PaymentSessionId,

    /// Identifier assigned by the processor.
    pub external_id: String,

    /// Page where the customer completes the payment.
    pub checkout_url: String,

    /// What is being paid for.
    pub purpose: PaymentPurpose,

    /// Amount requested.
    pub amount: Cents,

    /// State of the session.
    pub status: PaymentSessionStatus,

    /// When the session was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// Money received towards a booking.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payment {
    /// Identifier of the payment.
    pub id: PaymentId,

    /// Booking the payment counts towards.
    pub booking_id: BookingId,

    /// Session through which the payment was made.
    pub session_id: PaymentSessionId,

    /// Amount received.
    pub amount: Cents,

    /// When the payment was confirmed.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// State of a subscription.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Waiting for the first payment.
    Pending,

    /// Paid and in effect.
    Active,

    /// Ended by the customer.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "pending" => Ok(SubscriptionStatus::Pending),
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            s => Err(ModelError(format!("Unknown subscription status '{}'", s))),
        }
    }
}

/// A membership plan purchased by a customer.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Subscription {
    /// Identifier of the subscription.
    pub id: SubscriptionId,

    /// Subscribed customer.
    pub user_id: UserId,

    /// Name of the plan.
    pub plan: String,

    /// Price paid for the plan.
    pub price: Cents,

    /// State of the subscription.
    pub status: SubscriptionStatus,

    /// When the subscription was requested.
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_as_str_parse() {
        for status in [PaymentSessionStatus::Pending, PaymentSessionStatus::Paid] {
            assert_eq!(status, PaymentSessionStatus::parse(status.as_str()).unwrap());
        }
        assert!(PaymentSessionStatus::parse("PAID").is_err());
    }

    #[test]
    fn test_subscription_status_as_str_parse() {
        for status in
            [SubscriptionStatus::Pending, SubscriptionStatus::Active, SubscriptionStatus::Cancelled]
        {
            assert_eq!(status, SubscriptionStatus::parse(status.as_str()).unwrap());
        }
        assert!(SubscriptionStatus::parse("").is_err());
    }

    #[test]
    fn test_purpose_serde() {
        let id = BookingId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            r#"{"kind":"booking","id":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#,
            serde_json::to_string(&PaymentPurpose::Booking(id)).unwrap()
        );
    }
}
