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

//! Queries for users, customers and settings.

use super::expect_one_row;
use crate::model::{Customer, CustomerProfile, EmailAddress, PromotionId, User, UserId, UserSettings};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite;
use autorent_core::db::{DbResult, Executor};
use sqlx::Row;
use time::Date;

impl_from_row!(User, |row, map_sqlx_error| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(map_sqlx_error)?;
    let email: String = row.try_get("email").map_err(map_sqlx_error)?;
    let is_staff: bool = row.try_get("is_staff").map_err(map_sqlx_error)?;

    Ok(User { id: UserId::new(id)?, name, email: EmailAddress::new(email)?, is_staff })
});

impl_from_row!(Customer, |row, map_sqlx_error| {
    let user_id: String = row.try_get("user_id").map_err(map_sqlx_error)?;
    let phone: String = row.try_get("phone").map_err(map_sqlx_error)?;
    let license_number: String = row.try_get("license_number").map_err(map_sqlx_error)?;
    let license_expiry: Date = row.try_get("license_expiry").map_err(map_sqlx_error)?;
    let address: String = row.try_get("address").map_err(map_sqlx_error)?;
    let reward_points: i64 = row.try_get("reward_points").map_err(map_sqlx_error)?;
    let golden_member: bool = row.try_get("golden_member").map_err(map_sqlx_error)?;
    let subscription_plan: Option<String> =
        row.try_get("subscription_plan").map_err(map_sqlx_error)?;

    Ok(Customer {
        user_id: UserId::new(user_id)?,
        phone,
        license_number,
        license_expiry,
        address,
        reward_points,
        golden_member,
        subscription_plan,
        redeemed_promotions: vec![],
        used_promotions: vec![],
    })
});

impl_from_row!(UserSettings, |row, map_sqlx_error| {
    let dark_mode: bool = row.try_get("dark_mode").map_err(map_sqlx_error)?;
    let language: String = row.try_get("language").map_err(map_sqlx_error)?;
    let currency: String = row.try_get("currency").map_err(map_sqlx_error)?;

    let settings = UserSettings { dark_mode, language, currency };
    settings.validate()?;
    Ok(settings)
});

/// Creates or updates the `user`.
pub async fn put_user(ex: &mut Executor, user: &User) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO users (id, name, email, is_staff) VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, email = EXCLUDED.email, is_staff = EXCLUDED.is_staff";
            let done = sqlx::query(query_str)
                .bind(user.id.as_str())
                .bind(user.name.as_str())
                .bind(user.email.as_str())
                .bind(user.is_staff)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO users (id, name, email, is_staff) VALUES (?, ?, ?, ?)
                ON CONFLICT (id) DO UPDATE
                SET name = excluded.name, email = excluded.email, is_staff = excluded.is_staff";
            let done = sqlx::query(query_str)
                .bind(user.id.as_str())
                .bind(user.name.as_str())
                .bind(user.email.as_str())
                .bind(user.is_staff)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Gets the user identified by `id`.
pub async fn get_user(ex: &mut Executor, id: &UserId) -> DbResult<User> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM users WHERE id = $1";
            let raw = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE id = ?";
            let raw = sqlx::query(query_str)
                .bind(id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Creates the customer profile of `user_id` or updates the personal details of an existing one.
///
/// Reward points, membership and promotions of an existing customer are left untouched.
pub async fn put_customer_profile(
    ex: &mut Executor,
    user_id: &UserId,
    profile: &CustomerProfile,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO customers (user_id, phone, license_number, license_expiry, address)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id) DO UPDATE
                SET
                    phone = EXCLUDED.phone,
                    license_number = EXCLUDED.license_number,
                    license_expiry = EXCLUDED.license_expiry,
                    address = EXCLUDED.address";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(profile.phone.as_str())
                .bind(profile.license_number.as_str())
                .bind(profile.license_expiry)
                .bind(profile.address.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO customers (user_id, phone, license_number, license_expiry, address)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE
                SET
                    phone = excluded.phone,
                    license_number = excluded.license_number,
                    license_expiry = excluded.license_expiry,
                    address = excluded.address";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(profile.phone.as_str())
                .bind(profile.license_number.as_str())
                .bind(profile.license_expiry)
                .bind(profile.address.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Gets the promotions recorded for `user_id`, split into the redeemed and the used ones.
async fn get_customer_promotions(
    ex: &mut Executor,
    user_id: &UserId,
) -> DbResult<(Vec<PromotionId>, Vec<PromotionId>)> {
    let raw: Vec<(String, bool)> = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT promotion_id, used FROM customer_promotions
                WHERE user_id = $1
                ORDER BY promotion_id";
            let rows = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            let mut raw = Vec::with_capacity(rows.len());
            for row in rows {
                let promotion_id: String =
                    row.try_get("promotion_id").map_err(postgres::map_sqlx_error)?;
                let used: bool = row.try_get("used").map_err(postgres::map_sqlx_error)?;
                raw.push((promotion_id, used));
            }
            raw
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT promotion_id, used FROM customer_promotions
                WHERE user_id = ?
                ORDER BY promotion_id";
            let rows = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let mut raw = Vec::with_capacity(rows.len());
            for row in rows {
                let promotion_id: String =
                    row.try_get("promotion_id").map_err(sqlite::map_sqlx_error)?;
                let used: bool = row.try_get("used").map_err(sqlite::map_sqlx_error)?;
                raw.push((promotion_id, used));
            }
            raw
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    let mut redeemed = vec![];
    let mut used = vec![];
    for (promotion_id, is_used) in raw {
        let promotion_id = PromotionId::parse(&promotion_id)?;
        if is_used {
            used.push(promotion_id);
        } else {
            redeemed.push(promotion_id);
        }
    }
    Ok((redeemed, used))
}

/// Gets the customer profile of `user_id`, including its promotions.
pub async fn get_customer(ex: &mut Executor, user_id: &UserId) -> DbResult<Customer> {
    let mut customer = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM customers WHERE user_id = $1";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Customer::try_from(raw)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM customers WHERE user_id = ?";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Customer::try_from(raw)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    let (redeemed, used) = get_customer_promotions(ex, user_id).await?;
    customer.redeemed_promotions = redeemed;
    customer.used_promotions = used;
    Ok(customer)
}

/// Adds `points` to the reward points of `user_id`.
pub async fn add_reward_points(ex: &mut Executor, user_id: &UserId, points: i64) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str =
                "UPDATE customers SET reward_points = reward_points + $1 WHERE user_id = $2";
            let done = sqlx::query(query_str)
                .bind(points)
                .bind(user_id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str =
                "UPDATE customers SET reward_points = reward_points + ? WHERE user_id = ?";
            let done = sqlx::query(query_str)
                .bind(points)
                .bind(user_id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Sets the membership details of `user_id`.
pub async fn set_membership(
    ex: &mut Executor,
    user_id: &UserId,
    golden_member: bool,
    subscription_plan: Option<&str>,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE customers SET golden_member = $1, subscription_plan = $2
                WHERE user_id = $3";
            let done = sqlx::query(query_str)
                .bind(golden_member)
                .bind(subscription_plan)
                .bind(user_id.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE customers SET golden_member = ?, subscription_plan = ?
                WHERE user_id = ?";
            let done = sqlx::query(query_str)
                .bind(golden_member)
                .bind(subscription_plan)
                .bind(user_id.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}

/// Gets the stored settings of `user_id`, if any.
pub async fn get_settings(ex: &mut Executor, user_id: &UserId) -> DbResult<Option<UserSettings>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM settings WHERE user_id = $1";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw.map(UserSettings::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM settings WHERE user_id = ?";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw.map(UserSettings::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Creates or replaces the settings of `user_id`.
pub async fn put_settings(
    ex: &mut Executor,
    user_id: &UserId,
    settings: &UserSettings,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO settings (user_id, dark_mode, language, currency)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id) DO UPDATE
                SET
                    dark_mode = EXCLUDED.dark_mode,
                    language = EXCLUDED.language,
                    currency = EXCLUDED.currency";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(settings.dark_mode)
                .bind(settings.language.as_str())
                .bind(settings.currency.as_str())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO settings (user_id, dark_mode, language, currency)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE
                SET
                    dark_mode = excluded.dark_mode,
                    language = excluded.language,
                    currency = excluded.currency";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(settings.dark_mode)
                .bind(settings.language.as_str())
                .bind(settings.currency.as_str())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    expect_one_row(rows_affected)
}
