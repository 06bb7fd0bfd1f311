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

//! Extends the driver with operations on promotions.

use crate::db;
use crate::driver::{find_customer, find_promotion, require_self_or_staff, require_staff, Driver};
use crate::model::{NewPromotion, Promotion, PromotionId, RedeemStatus, UserId};
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Publishes a new promotion.
    pub(crate) async fn create_promotion(
        self,
        caller: &UserId,
        new: NewPromotion,
    ) -> DriverResult<Promotion> {
        let promotion = new.into_promotion(PromotionId::generate())?;

        let mut tx = self.db.begin().await?;
        require_staff(&mut tx, caller).await?;
        db::insert_promotion(tx.ex(), &promotion).await?;
        tx.commit().await?;

        info!("Created promotion {} ({})", promotion.id, promotion.title);
        Ok(promotion)
    }

    /// Lists the promotions that `user_id` can see today.
    pub(crate) async fn list_promotions_for(
        self,
        caller: &UserId,
        user_id: &UserId,
    ) -> DriverResult<Vec<Promotion>> {
        let today = self.clock.today();

        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        let customer = find_customer(&mut tx, user_id).await?;
        let promotions = db::get_promotions_valid_on(tx.ex(), today).await?;
        tx.commit().await?;

        Ok(promotions
            .into_iter()
            .filter(|p| p.is_visible_to(customer.golden_member, today))
            .collect())
    }

    /// Adds `promotion_id` to the redeemed promotions of `user_id`.
    pub(crate) async fn redeem_promotion(
        self,
        caller: &UserId,
        user_id: &UserId,
        promotion_id: PromotionId,
    ) -> DriverResult<RedeemStatus> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;

        let customer = find_customer(&mut tx, user_id).await?;
        let promotion = find_promotion(&mut tx, promotion_id).await?;
        if !promotion.is_visible_to(customer.golden_member, self.clock.today()) {
            return Err(DriverError::InvalidInput(format!(
                "Promotion {} is not available to user {}",
                promotion_id,
                user_id.as_str()
            )));
        }

        let status = if db::add_redeemed_promotion(tx.ex(), user_id, promotion_id).await? {
            RedeemStatus::Success
        } else {
            RedeemStatus::AlreadyRedeemed
        };
        tx.commit().await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{Audience, PromotionKind};
    use time::macros::date;

    fn new_promotion(kind: PromotionKind, value: Option<i64>) -> NewPromotion {
        NewPromotion {
            title: "Summer".to_owned(),
            description: "Summer deals".to_owned(),
            image_url: None,
            kind,
            value,
            valid_from: date!(2026 - 06 - 01),
            valid_until: date!(2026 - 06 - 30),
            audience: Audience::All,
            targets: vec![],
            golden_only: false,
        }
    }

    #[tokio::test]
    async fn test_create_promotion_ok() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;

        let promotion = context
            .driver()
            .create_promotion(&staff, new_promotion(PromotionKind::Discount, Some(15)))
            .await
            .unwrap();
        assert_eq!("Summer", promotion.title);
        assert_eq!(
            promotion,
            db::get_promotion(&mut context.ex().await, promotion.id).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_promotion_errors() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;
        let alice = context.create_customer("alice").await;

        match context
            .driver()
            .create_promotion(&alice, new_promotion(PromotionKind::Offer, None))
            .await
        {
            Err(DriverError::Unauthorized(msg)) => assert!(msg.contains("Only staff")),
            e => panic!("{:?}", e),
        }

        match context
            .driver()
            .create_promotion(&staff, new_promotion(PromotionKind::Permanent, None))
            .await
        {
            Err(DriverError::InvalidInput(_)) => (),
            e => panic!("{:?}", e),
        }

        let mut backwards = new_promotion(PromotionKind::Offer, None);
        backwards.valid_until = date!(2026 - 05 - 01);
        match context.driver().create_promotion(&staff, backwards).await {
            Err(DriverError::InvalidInput(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_list_promotions_for_visibility() {
        let context = TestContext::setup().await;
        let staff = context.create_staff("staff").await;
        let alice = context.create_customer("alice").await;
        let bob = context.create_customer("bob").await;
        context.make_golden(&bob).await;

        let everyone = context
            .driver()
            .create_promotion(&staff, new_promotion(PromotionKind::Offer, None))
            .await
            .unwrap();
        let mut golden = new_promotion(PromotionKind::Upgrade, None);
        golden.golden_only = true;
        let golden = context.driver().create_promotion(&staff, golden).await.unwrap();
        let mut hidden = new_promotion(PromotionKind::Offer, None);
        hidden.audience = Audience::None;
        context.driver().create_promotion(&staff, hidden).await.unwrap();
        let mut later = new_promotion(PromotionKind::Offer, None);
        later.valid_from = date!(2026 - 06 - 15);
        context.driver().create_promotion(&staff, later).await.unwrap();

        let ids = |promotions: Vec<Promotion>| -> Vec<PromotionId> {
            promotions.into_iter().map(|p| p.id).collect()
        };
        assert_eq!(
            vec![everyone.id],
            ids(context.driver().list_promotions_for(&alice, &alice).await.unwrap())
        );

        let mut bob_ids = ids(context.driver().list_promotions_for(&bob, &bob).await.unwrap());
        bob_ids.sort();
        let mut expected = vec![everyone.id, golden.id];
        expected.sort();
        assert_eq!(expected, bob_ids);

        match context.driver().list_promotions_for(&alice, &bob).await {
            Err(DriverError::Unauthorized(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_redeem_promotion_twice() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let promotion =
            context.create_promotion(PromotionKind::Discount, Some(10), Audience::All, &[]).await;

        assert_eq!(
            RedeemStatus::Success,
            context.driver().redeem_promotion(&alice, &alice, promotion.id).await.unwrap()
        );
        assert_eq!(
            RedeemStatus::AlreadyRedeemed,
            context.driver().redeem_promotion(&alice, &alice, promotion.id).await.unwrap()
        );
        assert_eq!(vec![promotion.id], context.get_customer(&alice).await.redeemed_promotions);
    }

    #[tokio::test]
    async fn test_redeem_promotion_errors() {
        let context = TestContext::setup().await;
        let alice = context.create_customer("alice").await;
        let bob = context.create_customer("bob").await;
        let promotion =
            context.create_promotion(PromotionKind::Offer, None, Audience::None, &[]).await;

        match context.driver().redeem_promotion(&alice, &alice, promotion.id).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("not available")),
            e => panic!("{:?}", e),
        }

        match context.driver().redeem_promotion(&alice, &alice, PromotionId::generate()).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("Promotion")),
            e => panic!("{:?}", e),
        }

        match context.driver().redeem_promotion(&bob, &alice, promotion.id).await {
            Err(DriverError::Unauthorized(_)) => (),
            e => panic!("{:?}", e),
        }
        assert!(context.get_customer(&alice).await.redeemed_promotions.is_empty());
    }
}
