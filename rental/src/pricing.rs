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

//! Price calculation for bookings.
//!
//! Customers can pay a booking in installments: one per week for rentals of a week or longer,
//! and one per day for shorter ones.

use crate::model::{Cents, Extras, Percent};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Daily price of the insurance extra, in cents.
const INSURANCE_PER_DAY: i64 = 1500;

/// Daily price of the GPS extra, in cents.
const GPS_PER_DAY: i64 = 500;

/// Daily price of the child seat extra, in cents.
const CHILD_SEAT_PER_DAY: i64 = 700;

/// Daily price of the chauffeur extra, in cents.
const CHAUFFEUR_PER_DAY: i64 = 5000;

/// Number of days covered by a weekly installment.
const DAYS_PER_WEEK: i64 = 7;

/// Breakdown of the price of a booking.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quote {
    /// Price per day including extras.
    pub rate_per_day: Cents,

    /// Number of charged days.
    pub days: i64,

    /// Price before discounts.
    pub subtotal: Cents,

    /// Amount taken off by the promotion.
    pub discount: Cents,

    /// Price to pay.
    pub total: Cents,

    /// Number of installments in which the total can be paid.
    pub installment_count: i64,

    /// Amount of each installment.
    pub installment_amount: Cents,
}

/// Returns the daily price of the selected `extras`, in cents.
fn extras_per_day(extras: &Extras) -> i64 {
    let mut total = 0;
    if extras.insurance {
        total += INSURANCE_PER_DAY;
    }
    if extras.gps {
        total += GPS_PER_DAY;
    }
    if extras.child_seat {
        total += CHILD_SEAT_PER_DAY;
    }
    if extras.chauffeur {
        total += CHAUFFEUR_PER_DAY;
    }
    total
}

/// Divides the non-negative `n` by the positive `d` rounding halves up.
fn div_round_half_up(n: i64, d: i64) -> i64 {
    let rounding = if (n % d) * 2 >= d { 1 } else { 0 };
    n / d + rounding
}

/// Converts a computed amount back to `Cents`, detecting overflows.
fn checked_cents(amount: Option<i64>) -> ModelResult<Cents> {
    match amount {
        Some(amount) => Cents::new(amount),
        None => Err(ModelError("Price is too large".to_owned())),
    }
}

/// Computes the price of renting a car priced at `price_per_day` for `days` days with the
/// selected `extras` and an optional `promotion` discount.
pub fn quote(
    price_per_day: Cents,
    days: i64,
    extras: &Extras,
    promotion: Option<Percent>,
) -> ModelResult<Quote> {
    if days < 1 {
        return Err(ModelError(format!("A booking must last at least one day; got {}", days)));
    }

    let rate_per_day = checked_cents(price_per_day.as_i64().checked_add(extras_per_day(extras)))?;
    let subtotal = checked_cents(rate_per_day.as_i64().checked_mul(days))?;
    let discount = match promotion {
        Some(percent) => {
            let scaled = subtotal.as_i64().checked_mul(i64::from(percent.value()));
            checked_cents(scaled.map(|scaled| div_round_half_up(scaled, 100)))?
        }
        None => Cents::ZERO,
    };
    let total = subtotal.saturating_sub(discount);

    let installment_count = if days >= DAYS_PER_WEEK { days / DAYS_PER_WEEK } else { days };
    let installment_amount =
        Cents::new(div_round_half_up(total.as_i64(), installment_count))?;

    Ok(Quote {
        rate_per_day,
        days,
        subtotal,
        discount,
        total,
        installment_count,
        installment_amount,
    })
}
