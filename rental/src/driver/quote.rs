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

//! Extends the driver with the `quote` method.

use crate::driver::{find_promotion, find_visible_car, Driver};
use crate::model::{CarRegistration, Extras, PromotionId};
use crate::pricing::{self, Quote};
use autorent_core::driver::{DriverError, DriverResult};
use time::Date;

impl Driver {
    /// Prices a hypothetical booking of the car with `registration` between `start_date` and
    /// `end_date`, optionally applying the discount of `promotion_id`.
    ///
    /// The promotion must be active today and apply to the car, but it does not need to have
    /// been redeemed: this lets customers preview the effect of a promotion before redeeming it.
    pub(crate) async fn quote(
        self,
        registration: &CarRegistration,
        start_date: Date,
        end_date: Date,
        extras: Extras,
        promotion_id: Option<PromotionId>,
    ) -> DriverResult<Quote> {
        let days = (end_date - start_date).whole_days();

        let mut tx = self.db.begin().await?;
        let car = find_visible_car(&mut tx, registration).await?;

        let percent = match promotion_id {
            None => None,
            Some(id) => {
                let promotion = find_promotion(&mut tx, id).await?;
                if !promotion.is_active(self.clock.today()) {
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
                promotion.discount_percent()?
            }
        };
        tx.commit().await?;

        Ok(pricing::quote(car.price_per_day, days, &extras, percent)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{Audience, Cents, PromotionKind};
    use time::macros::date;

    #[tokio::test]
    async fn test_quote_ten_days_no_extras() {
        let context = TestContext::setup().await;
        let car = context.create_car("AB123", 5000, &[]).await;

        let quote = context
            .driver()
            .quote(
                &car.registration,
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 11),
                Extras::default(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(10, quote.days);
        assert_eq!(Cents::new(50000).unwrap(), quote.total);
        assert_eq!(1, quote.installment_count);
        assert_eq!(Cents::new(50000).unwrap(), quote.installment_amount);
    }

    #[tokio::test]
    async fn test_quote_with_promotion_and_extras() {
        let context = TestContext::setup().await;
        let car = context.create_car("AB123", 5000, &["compact"]).await;
        let promotion = context
            .create_promotion(PromotionKind::Discount, Some(10), Audience::Specific, &["compact"])
            .await;

        let extras = Extras { gps: true, ..Default::default() };
        let quote = context
            .driver()
            .quote(
                &car.registration,
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 03),
                extras,
                Some(promotion.id),
            )
            .await
            .unwrap();
        assert_eq!(Cents::new(5500).unwrap(), quote.rate_per_day);
        assert_eq!(Cents::new(11000).unwrap(), quote.subtotal);
        assert_eq!(Cents::new(1100).unwrap(), quote.discount);
        assert_eq!(Cents::new(9900).unwrap(), quote.total);
        assert_eq!(2, quote.installment_count);
        assert_eq!(Cents::new(4950).unwrap(), quote.installment_amount);
    }

    #[tokio::test]
    async fn test_quote_errors() {
        let context = TestContext::setup().await;
        let car = context.create_car("AB123", 5000, &["compact"]).await;
        let promotion = context
            .create_promotion(PromotionKind::Discount, Some(10), Audience::Specific, &["suv"])
            .await;

        match context
            .driver()
            .quote(
                &car.registration,
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 01),
                Extras::default(),
                None,
            )
            .await
        {
            Err(DriverError::InvalidInput(_)) => (),
            e => panic!("{:?}", e),
        }

        match context
            .driver()
            .quote(
                &car.registration,
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 02),
                Extras::default(),
                Some(promotion.id),
            )
            .await
        {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("does not apply")),
            e => panic!("{:?}", e),
        }

        context.clock.set(time::macros::datetime!(2026-08-01 00:00:00 UTC));
        let expired = context
            .create_promotion(PromotionKind::Discount, Some(10), Audience::All, &[])
            .await;
        match context
            .driver()
            .quote(
                &car.registration,
                date!(2026 - 08 - 10),
                date!(2026 - 08 - 12),
                Extras::default(),
                Some(expired.id),
            )
            .await
        {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("not active")),
            e => panic!("{:?}", e),
        }

        match context
            .driver()
            .quote(
                &CarRegistration::from("NOPE1"),
                date!(2026 - 07 - 01),
                date!(2026 - 07 - 02),
                Extras::default(),
                None,
            )
            .await
        {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
    }
}
