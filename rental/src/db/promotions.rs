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

//! Queries for promotions and their redemptions.

use super::expect_one_row;
use crate::model::{Audience, Promotion, PromotionId, PromotionKind, UserId};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite;
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;
use time::Date;

impl_from_row!(Promotion, |row, map_sqlx_error| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let title: String = row.try_get("title").map_err(map_sqlx_error)?;
    let description: String = row.try_get("description").map_err(map_sqlx_error)?;
    let image_url: Option<String> = row.try_get("image_url").map_err(map_sqlx_error)?;
    let kind: String = row.try_get("kind").map_err(map_sqlx_error)?;
    let value: Option<i64> = row.try_get("value").map_err(map_sqlx_error)?;
    let valid_from: Date = row.try_get("valid_from").map_err(map_sqlx_error)?;
    let valid_until: Date = row.try_get("valid_until").map_err(map_sqlx_error)?;
    let audience: String = row.try_get("audience").map_err(map_sqlx_error)?;
    let targets: String = row.try_get("targets").map_err(map_sqlx_error)?;
    let golden_only: bool = row.try_get("golden_only").map_err(map_sqlx_error)?;

    Ok(Promotion {
        id: PromotionId::parse(&id)?,
        title,
        description,
        image_url,
        kind: PromotionKind::parse(&kind)?,
        value,
        valid_from,
        valid_until,
        audience: Audience::parse(&audience)?,
        targets: serde_json::from_str(&targets)?,
        golden_only,
    })
});

/// Inserts a new `promotion`.
pub async fn insert_promotion(ex: &mut Executor, promotion: &Promotion) -> DbResult<()> {
    let targets = serde_json::to_string(&promotion.targets)?;

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO promotions (
                    id, title, description, image_url, kind, value,
                    valid_from, valid_until, audience, targets, golden_only
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";
            let done = sqlx::query(query_str)
                .bind(promotion.id.to_string())
                .bind(promotion.title.as_str())
                .bind(promotion.description.as_str())
                .bind(promotion.image_url.as_deref())
                .bind(promotion.kind.as_str())
                .bind(promotion.value)
                .bind(promotion.valid_from)
                .bind(promotion.valid_until)
                .bind(promotion.audience.as_str())
                .bind(targets.as_str())
                .bind(promotion.golden_only)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO promotions (
                    id, title, description, image_url, kind, value,
                    valid_from, valid_until, audience, targets, golden_only
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(promotion.id.to_string())
                .bind(promotion.title.as_str())
                .bind(promotion.description.as_str())
                .bind(promotion.image_url.as_deref())
                .bind(promotion.kind.as_str())
                .bind(promotion.value)
                .bind(promotion.valid_from)
                .bind(promotion.valid_until)
                .bind(promotion.audience.as_str())
                .bind(targets.as_str())
                .bind(promotion.golden_only)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets the promotion identified by `id`.
pub async fn get_promotion(ex: &mut Executor, id: PromotionId) -> DbResult<Promotion> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM promotions WHERE id = $1";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Promotion::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM promotions WHERE id = ?";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Promotion::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the promotions whose validity window contains `day`, sorted by expiration.
pub async fn get_promotions_valid_on(ex: &mut Executor, day: Date) -> DbResult<Vec<Promotion>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM promotions
                WHERE valid_from <= $1 AND valid_until >= $1
                ORDER BY valid_until, title";
            let rows = sqlx::query(query_str)
                .bind(day)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Promotion::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM promotions
                WHERE valid_from <= ? AND valid_until >= ?
                ORDER BY valid_until, title";
            let rows = sqlx::query(query_str)
                .bind(day)
                .bind(day)
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Promotion::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Records that `user_id` redeemed `promotion_id`.
///
/// Returns false without changing anything if the promotion had already been redeemed, whether it
/// was used afterwards or not.
pub async fn add_redeemed_promotion(
    ex: &mut Executor,
    user_id: &UserId,
    promotion_id: PromotionId,
) -> DbResult<bool> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO customer_promotions (user_id, promotion_id, used)
                VALUES ($1, $2, FALSE)
                ON CONFLICT (user_id, promotion_id) DO NOTHING";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(promotion_id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO customer_promotions (user_id, promotion_id, used)
                VALUES (?, ?, FALSE)
                ON CONFLICT (user_id, promotion_id) DO NOTHING";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(promotion_id.to_string())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DbError::BackendError("Insertion affected more than one row".to_owned())),
    }
}

/// Moves `promotion_id` from the redeemed to the used promotions of `user_id`.
///
/// Fails with `NotFound` if the promotion is not in the redeemed list.
pub async fn mark_promotion_used(
    ex: &mut Executor,
    user_id: &UserId,
    promotion_id: PromotionId,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE customer_promotions SET used = TRUE
                WHERE user_id = $1 AND promotion_id = $2 AND NOT used";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(promotion_id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE customer_promotions SET used = TRUE
                WHERE user_id = ? AND promotion_id = ? AND NOT used";
            let done = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(promotion_id.to_string())
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
