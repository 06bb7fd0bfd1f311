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

//! Extends the driver with operations on users, customer profiles and settings.

use crate::db;
use crate::driver::{find_customer, find_user, is_staff, require_self_or_staff, Driver};
use crate::model::{Customer, CustomerProfile, User, UserId, UserSettings};
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

impl Driver {
    /// Creates or updates the identity of a user as known by the authentication provider.
    ///
    /// Users can only update themselves and only staff can grant staff privileges.
    pub(crate) async fn upsert_user(self, caller: &UserId, user: User) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;

        let caller_is_staff = is_staff(&mut tx, caller).await?;
        if !caller_is_staff {
            if caller != &user.id {
                return Err(DriverError::Unauthorized("Cannot modify other users".to_owned()));
            }
            if user.is_staff {
                return Err(DriverError::Unauthorized(
                    "Only staff can grant staff privileges".to_owned(),
                ));
            }
        }

        db::put_user(tx.ex(), &user).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Gets the details of user `id`.
    pub(crate) async fn get_user(self, caller: &UserId, id: &UserId) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, id).await?;
        let user = find_user(&mut tx, id).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Gets the customer profile of `user_id`.
    pub(crate) async fn get_customer(
        self,
        caller: &UserId,
        user_id: &UserId,
    ) -> DriverResult<Customer> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        let customer = find_customer(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(customer)
    }

    /// Creates or updates the customer profile of `user_id`, preserving reward points,
    /// membership and promotions.
    pub(crate) async fn put_customer(
        self,
        caller: &UserId,
        user_id: &UserId,
        profile: CustomerProfile,
    ) -> DriverResult<Customer> {
        profile.validate()?;

        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        find_user(&mut tx, user_id).await?;

        db::put_customer_profile(tx.ex(), user_id, &profile).await?;
        let customer = db::get_customer(tx.ex(), user_id).await?;
        tx.commit().await?;

        info!("Updated customer profile of {}", user_id.as_str());
        Ok(customer)
    }

    /// Gets the settings of `user_id`, or the defaults if none were stored yet.
    pub(crate) async fn get_settings(
        self,
        caller: &UserId,
        user_id: &UserId,
    ) -> DriverResult<UserSettings> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        find_user(&mut tx, user_id).await?;
        let settings = db::get_settings(tx.ex(), user_id).await?.unwrap_or_default();
        tx.commit().await?;
        Ok(settings)
    }

    /// Replaces the settings of `user_id`.
    pub(crate) async fn put_settings(
        self,
        caller: &UserId,
        user_id: &UserId,
        settings: UserSettings,
    ) -> DriverResult<UserSettings> {
        settings.validate()?;

        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, user_id).await?;
        find_user(&mut tx, user_id).await?;
        db::put_settings(tx.ex(), user_id, &settings).await?;
        tx.commit().await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::EmailAddress;
    use time::macros::date;

    fn user(id: &'static str, is_staff: bool) -> User {
        User {
            id: UserId::from(id),
            name: "Some name".to_owned(),
            email: EmailAddress::from("some@example.com"),
            is_staff,
        }
    }

    fn profile() -> CustomerProfile {
        CustomerProfile {
            phone: "555-0123".to_owned(),
            license_number: "B-123".to_owned(),
            license_expiry: date!(2030 - 01 - 31),
            address: "42 Elm Street".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_upsert_user_self() {
        let context = TestContext::setup().await;
        let id = UserId::from("alice");

        let alice = user("alice", false);
        assert_eq!(alice, context.driver().upsert_user(&id, alice.clone()).await.unwrap());
        assert_eq!(alice, context.driver().get_user(&id, &id).await.unwrap());

        let alice = User { name: "Alice Liddell".to_owned(), ..alice };
        context.driver().upsert_user(&id, alice.clone()).await.unwrap();
        assert_eq!(alice, context.driver().get_user(&id, &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_user_cannot_self_promote() {
        let context = TestContext::setup().await;
        let id = context.create_user("alice", false).await;

        match context.driver().upsert_user(&id, user("alice", true)).await {
            Err(DriverError::Unauthorized(msg)) => assert!(msg.contains("grant staff")),
            e => panic!("{:?}", e),
        }
        assert!(!context.driver().get_user(&id, &id).await.unwrap().is_staff);
    }

    #[tokio::test]
    async fn test_upsert_user_other() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;
        let staff = context.create_staff("boss").await;

        match context.driver().upsert_user(&alice, user("bob", false)).await {
            Err(DriverError::Unauthorized(msg)) => assert!(msg.contains("other users")),
            e => panic!("{:?}", e),
        }

        let bob = user("bob", true);
        context.driver().upsert_user(&staff, bob.clone()).await.unwrap();
        assert_eq!(bob, context.driver().get_user(&staff, &bob.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_user_not_found_and_unauthorized() {
        let context = TestContext::setup().await;
        let alice = context.create_user("alice", false).await;
        let bob = context.create_user("bob", false).await;

        match context.driver().get_user(&alice, &bob).await {
            Err(DriverError::Unauthorized(msg)) => assert!(msg.contains("user bob")),
            e => panic!("{:?}", e),
        }

        let ghost = UserId::from("ghost");
        match context.driver().get_user(&ghost, &ghost).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("User ghost not found")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_put_customer_create_and_update_preserves_state() {
        let context = TestContext::setup().await;
        let id = context.create_user("alice", false).await;

        let customer = context.driver().put_customer(&id, &id, profile()).await.unwrap();
        assert_eq!(Customer::new(id.clone(), profile()), customer);

        crate::db::add_reward_points(&mut context.ex().await, &id, 12).await.unwrap();
        context.make_golden(&id).await;

        let new_profile = CustomerProfile { phone: "555-9999".to_owned(), ..profile() };
        let customer = context.driver().put_customer(&id, &id, new_profile).await.unwrap();
        assert_eq!("555-9999", customer.phone);
        assert_eq!(12, customer.reward_points);
        assert!(customer.golden_member);

        assert_eq!(customer, context.driver().get_customer(&id, &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_customer_errors() {
        let context = TestContext::setup().await;
        let id = UserId::from("ghost");

        match context.driver().put_customer(&id, &id, profile()).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("not found")),
            e => panic!("{:?}", e),
        }

        let id = context.create_user("alice", false).await;
        let bad = CustomerProfile { license_number: " ".to_owned(), ..profile() };
        match context.driver().put_customer(&id, &id, bad).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("License number")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_get_customer_without_profile() {
        let context = TestContext::setup().await;
        let id = context.create_user("alice", false).await;

        match context.driver().get_customer(&id, &id).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("customer profile")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_settings_defaults_then_stored() {
        let context = TestContext::setup().await;
        let id = context.create_user("alice", false).await;

        assert_eq!(UserSettings::default(), context.driver().get_settings(&id, &id).await.unwrap());

        let settings =
            UserSettings { dark_mode: true, language: "fr".to_owned(), currency: "EUR".to_owned() };
        context.driver().put_settings(&id, &id, settings.clone()).await.unwrap();
        assert_eq!(settings, context.driver().get_settings(&id, &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_settings_errors() {
        let context = TestContext::setup().await;
        let ghost = UserId::from("ghost");
        match context.driver().get_settings(&ghost, &ghost).await {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("not found")),
            e => panic!("{:?}", e),
        }

        let id = context.create_user("alice", false).await;
        let bad = UserSettings { currency: "usd".to_owned(), ..Default::default() };
        match context.driver().put_settings(&id, &id, bad).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Currency")),
            e => panic!("{:?}", e),
        }
    }
}
