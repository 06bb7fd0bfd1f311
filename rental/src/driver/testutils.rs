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

//! Test utilities for the business logic.

use crate::db;
use crate::driver::{Driver, RentalOptions};
use crate::model::*;
use autorent_core::clocks::testutils::SettableClock;
use autorent_core::clocks::Clock;
use autorent_core::db::{Db, Executor};
use autorent_payments::MockGateway;
use std::sync::Arc;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

/// Instant at which every test starts.
pub(crate) const TEST_NOW: OffsetDateTime = datetime!(2026-06-01 09:00:00 UTC);

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock used by the driver, which tests can move around.
    pub(crate) clock: Arc<SettableClock>,

    /// The payment processor used by the driver.
    pub(crate) gateway: MockGateway,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database, a settable clock and a mock payment
    /// processor.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(RentalOptions::default()).await
    }

    /// Same as `setup` but with custom driver options.
    pub(crate) async fn setup_with(opts: RentalOptions) -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::from(autorent_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::from(SettableClock::new(TEST_NOW));
        let gateway = MockGateway::default();
        let driver = Driver::new(db.clone(), clock.clone(), Arc::from(gateway.clone()), opts);
        Self { db, clock, gateway, driver }
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Creates a user that has not filled in a customer profile.
    pub(crate) async fn create_user(&self, id: &'static str, is_staff: bool) -> UserId {
        let user = User {
            id: UserId::from(id),
            name: format!("User {}", id),
            email: EmailAddress::new(format!("{}@example.com", id)).unwrap(),
            is_staff,
        };
        db::put_user(&mut self.ex().await, &user).await.unwrap();
        user.id
    }

    /// Creates a staff member.
    pub(crate) async fn create_staff(&self, id: &'static str) -> UserId {
        self.create_user(id, true).await
    }

    /// Creates a customer whose license is valid for years to come.
    pub(crate) async fn create_customer(&self, id: &'static str) -> UserId {
        let user_id = self.create_user(id, false).await;
        let profile = CustomerProfile {
            phone: "555-0100".to_owned(),
            license_number: format!("LIC-{}", id),
            license_expiry: date!(2035 - 12 - 31),
            address: "1 Main Street".to_owned(),
        };
        db::put_customer_profile(&mut self.ex().await, &user_id, &profile).await.unwrap();
        user_id
    }

    /// Grants golden membership to `user_id`.
    pub(crate) async fn make_golden(&self, user_id: &UserId) {
        db::set_membership(&mut self.ex().await, user_id, true, Some(GOLDEN_PLAN)).await.unwrap();
    }

    /// Adds a car to the fleet with the given daily `price` and `categories`.
    pub(crate) async fn create_car(
        &self,
        registration: &'static str,
        price: i64,
        categories: &[&str],
    ) -> Car {
        let car = Car {
            registration: CarRegistration::from(registration),
            make: "Toyota".to_owned(),
            model: "Corolla".to_owned(),
            trim: "Hybrid".to_owned(),
            year: 2025,
            color: "white".to_owned(),
            available: true,
            disabled: false,
            price_per_day: Cents::new(price).unwrap(),
            pictures: vec![],
            categories: categories.iter().map(|c| (*c).to_owned()).collect(),
            average_rating: None,
        };
        db::insert_car(&mut self.ex().await, &car).await.unwrap();
        car
    }

    /// Stores a promotion valid around the test date.
    pub(crate) async fn create_promotion(
        &self,
        kind: PromotionKind,
        value: Option<i64>,
        audience: Audience,
        targets: &[&str],
    ) -> Promotion {
        let promotion = Promotion {
            id: PromotionId::generate(),
            title: format!("{} promotion", kind.as_str()),
            description: String::new(),
            image_url: None,
            kind,
            value,
            valid_from: date!(2026 - 05 - 01),
            valid_until: date!(2026 - 07 - 31),
            audience,
            targets: targets.iter().map(|t| (*t).to_owned()).collect(),
            golden_only: false,
        };
        db::insert_promotion(&mut self.ex().await, &promotion).await.unwrap();
        promotion
    }

    /// Inserts a booking directly into the database, bypassing all business rules.  Useful to
    /// create bookings in the past.
    pub(crate) async fn insert_booking(
        &self,
        user_id: &UserId,
        car: &Car,
        start_date: Date,
        end_date: Date,
        total_cost: i64,
    ) -> Booking {
        let booking = Booking {
            id: BookingId::generate(),
            user_id: user_id.clone(),
            car: car.registration.clone(),
            start_date,
            end_date,
            extras: Extras::default(),
            promotion_id: None,
            total_cost: Cents::new(total_cost).unwrap(),
            paid: Cents::ZERO,
            status: BookingStatus::Pending,
            pickup_location: "Airport".to_owned(),
            dropoff_location: "Airport".to_owned(),
            created: self.clock.now_utc(),
            review_id: None,
        };
        db::insert_booking(&mut self.ex().await, &booking).await.unwrap();
        booking
    }

    /// Builds a booking request for `car` with no extras and no promotion.
    pub(crate) fn booking_request(
        &self,
        car: &Car,
        start_date: Date,
        end_date: Date,
    ) -> BookingRequest {
        BookingRequest {
            car: car.registration.clone(),
            start_date,
            end_date,
            extras: Extras::default(),
            promotion_id: None,
            pickup_location: "Airport".to_owned(),
            dropoff_location: "Downtown".to_owned(),
        }
    }

    /// Gets a booking straight from the database.
    pub(crate) async fn get_booking(&self, id: BookingId) -> Booking {
        db::get_booking(&mut self.ex().await, id).await.unwrap()
    }

    /// Gets a car straight from the database.
    pub(crate) async fn get_car(&self, registration: &CarRegistration) -> Car {
        db::get_car(&mut self.ex().await, registration).await.unwrap()
    }

    /// Gets a customer straight from the database.
    pub(crate) async fn get_customer(&self, user_id: &UserId) -> Customer {
        db::get_customer(&mut self.ex().await, user_id).await.unwrap()
    }
}
