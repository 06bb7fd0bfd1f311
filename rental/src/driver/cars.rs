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

//! Extends the driver with operations on the fleet.

use crate::db;
use crate::driver::{find_car, find_visible_car, require_staff, Driver};
use crate::model::{Car, CarFilter, CarPatch, CarRegistration, Review, UserId};
use autorent_core::db::{DbError, TxExecutor};
use autorent_core::driver::{DriverError, DriverResult};
use log::info;

/// Recomputes and stores the average rating of `registration` from the reviews of its bookings.
pub(super) async fn refresh_car_rating(
    tx: &mut TxExecutor,
    registration: &CarRegistration,
) -> DriverResult<Option<f64>> {
    let reviews = db::get_car_reviews(tx.ex(), registration).await?;

    let average = if reviews.is_empty() {
        None
    } else {
        let sum: u32 = reviews.iter().map(|r| u32::from(r.rating.stars())).sum();
        Some(f64::from(sum) / reviews.len() as f64)
    };

    db::set_car_rating(tx.ex(), registration, average).await?;
    Ok(average)
}

impl Driver {
    /// Adds a new `car` to the fleet.
    pub(crate) async fn add_car(self, caller: &UserId, car: Car) -> DriverResult<Car> {
        let mut car = car.normalize()?;
        car.average_rating = None;

        let mut tx = self.db.begin().await?;
        require_staff(&mut tx, caller).await?;
        match db::insert_car(tx.ex(), &car).await {
            Ok(()) => (),
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(format!(
                    "Car {} already exists",
                    car.registration
                )));
            }
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;

        info!("Added car {} to the fleet", car.registration);
        Ok(car)
    }

    /// Gets the details of the car with `registration`.  Disabled cars cannot be found.
    pub(crate) async fn get_car(self, registration: &CarRegistration) -> DriverResult<Car> {
        let mut tx = self.db.begin().await?;
        let car = find_visible_car(&mut tx, registration).await?;
        tx.commit().await?;
        Ok(car)
    }

    /// Lists the cars that match `filter`, sorted by registration.
    pub(crate) async fn list_cars(self, filter: CarFilter) -> DriverResult<Vec<Car>> {
        let mut tx = self.db.begin().await?;
        let cars = db::get_enabled_cars(tx.ex()).await?;
        tx.commit().await?;
        Ok(cars.into_iter().filter(|car| filter.matches(car)).collect())
    }

    /// Applies `patch` to the car with `registration`.
    pub(crate) async fn update_car(
        self,
        caller: &UserId,
        registration: &CarRegistration,
        patch: CarPatch,
    ) -> DriverResult<Car> {
        let mut tx = self.db.begin().await?;
        require_staff(&mut tx, caller).await?;
        let car = patch.apply(find_car(&mut tx, registration).await?);
        db::update_car(tx.ex(), &car).await?;
        tx.commit().await?;
        Ok(car)
    }

    /// Recomputes the average rating of the car with `registration` from scratch.
    pub(crate) async fn recompute_car_rating(
        self,
        caller: &UserId,
        registration: &CarRegistration,
    ) -> DriverResult<Option<f64>> {
        let mut tx = self.db.begin().await?;
        require_staff(&mut tx, caller).await?;
        find_car(&mut tx, registration).await?;
        let average = refresh_car_rating(&mut tx, registration).await?;
        tx.commit().await?;
        Ok(average)
    }

    /// Lists the reviews of all bookings of the car with `registration`.
    pub(crate) async fn list_car_reviews(
        self,
        registration: &CarRegistration,
    ) -> DriverResult<Vec<Review>> {
        let mut tx = self.db.begin().await?;
        find_visible_car(&mut tx, registration).await?;
        let reviews = db::get_car_reviews(tx.ex(), registration).await?;
        tx.commit().await?;
        Ok(reviews)
    }
}
