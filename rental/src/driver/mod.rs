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

//! Business logic for the rental service.
//!
//! Operations receive the identity of the `caller` as established by the authentication gateway
//! and decide on their own whether the caller may act on the requested entities.  Staff members
//! may act on behalf of any customer.

use crate::db;
use crate::model::{Booking, BookingId, Car, CarRegistration, Cents, Customer, Promotion};
use crate::model::{PromotionId, User, UserId};
use autorent_core::clocks::Clock;
use autorent_core::db::{Db, DbError, TxExecutor};
use autorent_core::driver::{DriverError, DriverResult};
use autorent_core::env::get_optional_var;
use autorent_payments::PaymentGateway;
use std::sync::Arc;

mod bookings;
mod cars;
mod messages;
mod payments;
mod promotions;
mod quote;
mod reviews;
mod subscriptions;
#[cfg(test)]
pub(crate) mod testutils;
mod users;

/// Default value for the `golden_plan_price` setting, in cents.
const DEFAULT_GOLDEN_PLAN_PRICE: i64 = 2999;

/// Default value for the `points_per_dollars` setting.
const DEFAULT_POINTS_PER_DOLLARS: i64 = 10;

/// Configuration options for the rental driver.
#[derive(Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct RentalOptions {
    /// Price of the golden membership.
    pub golden_plan_price: Cents,

    /// Number of dollars a customer has to spend on a completed booking to earn one reward
    /// point.
    pub points_per_dollars: i64,
}

impl Default for RentalOptions {
    fn default() -> Self {
        Self {
            golden_plan_price: Cents::new(DEFAULT_GOLDEN_PLAN_PRICE)
                .expect("Default price must be valid"),
            points_per_dollars: DEFAULT_POINTS_PER_DOLLARS,
        }
    }
}

impl RentalOptions {
    /// Creates a new set of options from environment variables whose name is prefixed by
    /// `prefix`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let golden_plan_price = get_optional_var::<i64>(prefix, "GOLDEN_PLAN_PRICE")?
            .unwrap_or(DEFAULT_GOLDEN_PLAN_PRICE);
        let golden_plan_price = Cents::new(golden_plan_price)
            .map_err(|e| format!("Invalid {}_GOLDEN_PLAN_PRICE: {}", prefix, e))?;

        let points_per_dollars = get_optional_var::<i64>(prefix, "POINTS_PER_DOLLARS")?
            .unwrap_or(DEFAULT_POINTS_PER_DOLLARS);
        if points_per_dollars < 1 {
            return Err(format!("{}_POINTS_PER_DOLLARS must be positive", prefix));
        }

        Ok(Self { golden_plan_price, points_per_dollars })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Processor to collect payments with.
    gateway: Arc<dyn PaymentGateway + Send + Sync>,

    /// Options for the rental driver.
    opts: RentalOptions,
}

impl Driver {
    /// Creates a new driver backed by the given dependencies.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        gateway: Arc<dyn PaymentGateway + Send + Sync>,
        opts: RentalOptions,
    ) -> Self {
        Self { db, clock, gateway, opts }
    }
}

/// Returns true if `caller` is a known staff member.
async fn is_staff(tx: &mut TxExecutor, caller: &UserId) -> DriverResult<bool> {
    match db::get_user(tx.ex(), caller).await {
        Ok(user) => Ok(user.is_staff),
        Err(DbError::NotFound) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Fails unless `caller` is a staff member.
async fn require_staff(tx: &mut TxExecutor, caller: &UserId) -> DriverResult<()> {
    if !is_staff(tx, caller).await? {
        return Err(DriverError::Unauthorized("Only staff can perform this operation".to_owned()));
    }
    Ok(())
}

/// Fails unless `caller` is `user_id` itself or a staff member.
async fn require_self_or_staff(
    tx: &mut TxExecutor,
    caller: &UserId,
    user_id: &UserId,
) -> DriverResult<()> {
    if caller != user_id && !is_staff(tx, caller).await? {
        return Err(DriverError::Unauthorized(format!(
            "Cannot access data of user {}",
            user_id.as_str()
        )));
    }
    Ok(())
}

/// Gets the user `id`, with a descriptive error if it does not exist.
async fn find_user(tx: &mut TxExecutor, id: &UserId) -> DriverResult<User> {
    match db::get_user(tx.ex(), id).await {
        Ok(user) => Ok(user),
        Err(DbError::NotFound) => {
            Err(DriverError::NotFound(format!("User {} not found", id.as_str())))
        }
        Err(e) => Err(e.into()),
    }
}

/// Gets the customer profile of `id`, with a descriptive error if it does not exist.
async fn find_customer(tx: &mut TxExecutor, id: &UserId) -> DriverResult<Customer> {
    match db::get_customer(tx.ex(), id).await {
        Ok(customer) => Ok(customer),
        Err(DbError::NotFound) => Err(DriverError::NotFound(format!(
            "User {} does not have a customer profile",
            id.as_str()
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Gets the car with `registration`, including disabled ones.
async fn find_car(tx: &mut TxExecutor, registration: &CarRegistration) -> DriverResult<Car> {
    match db::get_car(tx.ex(), registration).await {
        Ok(car) => Ok(car),
        Err(DbError::NotFound) => {
            Err(DriverError::NotFound(format!("Car {} not found", registration)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Gets the car with `registration`, treating disabled cars as missing.
async fn find_visible_car(
    tx: &mut TxExecutor,
    registration: &CarRegistration,
) -> DriverResult<Car> {
    let car = find_car(tx, registration).await?;
    if car.disabled {
        return Err(DriverError::NotFound(format!("Car {} not found", registration)));
    }
    Ok(car)
}

/// Gets the booking `id`, with a descriptive error if it does not exist.
async fn find_booking(tx: &mut TxExecutor, id: BookingId) -> DriverResult<Booking> {
    match db::get_booking(tx.ex(), id).await {
        Ok(booking) => Ok(booking),
        Err(DbError::NotFound) => Err(DriverError::NotFound(format!("Booking {} not found", id))),
        Err(e) => Err(e.into()),
    }
}

/// Gets the promotion `id`, with a descriptive error if it does not exist.
async fn find_promotion(tx: &mut TxExecutor, id: PromotionId) -> DriverResult<Promotion> {
    match db::get_promotion(tx.ex(), id).await {
        Ok(promotion) => Ok(promotion),
        Err(DbError::NotFound) => {
            Err(DriverError::NotFound(format!("Promotion {} not found", id)))
        }
        Err(e) => Err(e.into()),
    }
}
