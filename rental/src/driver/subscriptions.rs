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

//! Extends the driver with golden membership subscriptions.

use crate::db;
use crate::driver::{find_customer, require_self_or_staff, Driver};
use crate::model::{
    PaymentPurpose, PaymentSession, Subscription, SubscriptionId, SubscriptionStatus, UserId,
    GOLDEN_PLAN,
};
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Subscribes `user_id` to `plan`.  The subscription only takes effect once the returned
    /// payment session is paid.
    pub(crate) async fn start_subscription(
        self,
        caller: &UserId,
        user_id: &UserId,
        plan: &str,
    ) -> DriverResult<PaymentSession> {
        if plan != GOLDEN_PLAN {
            return Err(DriverError::InvalidInput(format!("Unknown subscription plan {}", plan)));
        }

        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        find_customer(&mut tx, user_id).await?;

        let active =
            db::get_latest_subscription(tx.ex(), user_id, SubscriptionStatus::Active).await?;
        if active.is_some() {
            return Err(DriverError::AlreadyExists(format!(
                "User {} already has an active subscription",
                user_id.as_str()
            )));
        }

        let subscription = Subscription {
            id: SubscriptionId::generate(),
            user_id: user_id.clone(),
            plan: plan.to_owned(),
            price: self.opts.golden_plan_price,
            status: SubscriptionStatus::Pending,
            created: self.clock.now_utc(),
        };
        db::insert_subscription(tx.ex(), &subscription).await?;

        let session = self
            .open_payment_session(
                &mut tx,
                PaymentPurpose::Subscription(subscription.id),
                subscription.price,
                format!("Autorent {} membership", plan),
            )
            .await?;
        tx.commit().await?;

        info!("User {} started subscription {}", user_id.as_str(), subscription.id);
        Ok(session)
    }

    /// Ends the active subscription of `user_id`, revoking the membership benefits.
    pub(crate) async fn cancel_subscription(
        self,
        caller: &UserId,
        user_id: &UserId,
    ) -> DriverResult<Subscription> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;

        let mut subscription =
            match db::get_latest_subscription(tx.ex(), user_id, SubscriptionStatus::Active).await? {
                Some(subscription) => subscription,
                None => {
                    return Err(DriverError::NotFound(format!(
                        "User {} has no active subscription",
                        user_id.as_str()
                    )));
                }
            };

        subscription.status = SubscriptionStatus::Cancelled;
        db::set_subscription_status(tx.ex(), subscription.id, subscription.status).await?;
        db::set_membership(tx.ex(), user_id, false, None).await?;
        tx.commit().await?;

        info!("User {} cancelled subscription {}", user_id.as_str(), subscription.id);
        Ok(subscription)
    }
}
