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

//! Queries for payment sessions, payments and subscriptions.

use super::expect_one_row;
use crate::model::{
    BookingId, Cents, Payment, PaymentId, PaymentPurpose, PaymentSession, PaymentSessionId,
    PaymentSessionStatus, Subscription, SubscriptionId, SubscriptionStatus, UserId,
};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite::{self, split_timestamp};
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;

/// Reconstructs the purpose of a session from its two mutually-exclusive foreign keys.
fn purpose_from_columns(
    booking_id: Option<String>,
    subscription_id: Option<String>,
) -> DbResult<PaymentPurpose> {
    match (booking_id, subscription_id) {
        (Some(id), None) => Ok(PaymentPurpose::Booking(BookingId::parse(&id)?)),
        (None, Some(id)) => Ok(PaymentPurpose::Subscription(SubscriptionId::parse(&id)?)),
        _ => Err(DbError::DataIntegrityError(
            "Payment session must refer to exactly one booking or subscription".to_owned(),
        )),
    }
}

/// Splits the purpose of a session into the values of its two foreign keys.
fn purpose_to_columns(purpose: PaymentPurpose) -> (Option<String>, Option<String>) {
    match purpose {
        PaymentPurpose::Booking(id) => (Some(id.to_string()), None),
        PaymentPurpose::Subscription(id) => (None, Some(id.to_string())),
    }
}

impl_from_row!(PaymentSession, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let external_id: String = row.try_get("external_id").map_err(map_sqlx_error)?;
    let checkout_url: String = row.try_get("checkout_url").map_err(map_sqlx_error)?;
    let booking_id: Option<String> = row.try_get("booking_id").map_err(map_sqlx_error)?;
    let subscription_id: Option<String> =
        row.try_get("subscription_id").map_err(map_sqlx_error)?;
    let amount: i64 = row.try_get("amount").map_err(map_sqlx_error)?;
    let status: String = row.try_get("status").map_err(map_sqlx_error)?;
    let created = get_timestamp(&row, "created")?;

    Ok(PaymentSession {
        id: PaymentSessionId::parse(&id)?,
        external_id,
        checkout_url,
        purpose: purpose_from_columns(booking_id, subscription_id)?,
        amount: Cents::new(amount)?,
        status: PaymentSessionStatus::parse(&status)?,
        created,
    })
});

impl_from_row!(Payment, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let booking_id: String = row.try_get("booking_id").map_err(map_sqlx_error)?;
    let session_id: String = row.try_get("session_id").map_err(map_sqlx_error)?;
    let amount: i64 = row.try_get("amount").map_err(map_sqlx_error)?;
    let created = get_timestamp(&row, "created")?;

    Ok(Payment {
        id: PaymentId::parse(&id)?,
        booking_id: BookingId::parse(&booking_id)?,
        session_id: PaymentSessionId::parse(&session_id)?,
        amount: Cents::new(amount)?,
        created,
    })
});

impl_from_row!(Subscription, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let user_id: String = row.try_get("user_id").map_err(map_sqlx_error)?;
    let plan: String = row.try_get("plan").map_err(map_sqlx_error)?;
    let price: i64 = row.try_get("price").map_err(map_sqlx_error)?;
    let status: String = row.try_get("status").map_err(map_sqlx_error)?;
    let created = get_timestamp(&row, "created")?;

    Ok(Subscription {
        id: SubscriptionId::parse(&id)?,
        user_id: UserId::new(user_id)?,
        plan,
        price: Cents::new(price)?,
        status: SubscriptionStatus::parse(&status)?,
        created,
    })
});

/// Inserts a new payment `session`.
pub async fn insert_payment_session(ex: &mut Executor, session: &PaymentSession) -> DbResult<()> {
    let (booking_id, subscription_id) = purpose_to_columns(session.purpose);

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO payment_sessions (
                    id, external_id, checkout_url, booking_id, subscription_id,
                    amount, status, created
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";
            let done = sqlx::query(query_str)
                .bind(session.id.to_string())
                .bind(session.external_id.as_str())
                .bind(session.checkout_url.as_str())
                .bind(booking_id)
                .bind(subscription_id)
                .bind(session.amount.as_i64())
                .bind(session.status.as_str())
                .bind(session.created)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_secs, created_nsecs) = split_timestamp(session.created)?;

            let query_str = "
                INSERT INTO payment_sessions (
                    id, external_id, checkout_url, booking_id, subscription_id,
                    amount, status, created_secs, created_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(session.id.to_string())
                .bind(session.external_id.as_str())
                .bind(session.checkout_url.as_str())
                .bind(booking_id)
                .bind(subscription_id)
                .bind(session.amount.as_i64())
                .bind(session.status.as_str())
                .bind(created_secs)
                .bind(created_nsecs)
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

/// Gets the payment session that the processor knows as `external_id`.
pub async fn get_payment_session_by_external_id(
    ex: &mut Executor,
    external_id: &str,
) -> DbResult<PaymentSession> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM payment_sessions WHERE external_id = $1";
            let raw = sqlx::query(query_str)
                .bind(external_id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            PaymentSession::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM payment_sessions WHERE external_id = ?";
            let raw = sqlx::query(query_str)
                .bind(external_id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            PaymentSession::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Flags the payment session `id` as paid.
pub async fn mark_payment_session_paid(ex: &mut Executor, id: PaymentSessionId) -> DbResult<()> {
    let status = PaymentSessionStatus::Paid.as_str();

    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE payment_sessions SET status = $1 WHERE id = $2";
            let done = sqlx::query(query_str)
                .bind(status)
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE payment_sessions SET status = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(status)
                .bind(id.to_string())
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

/// Records a received `payment`.  Fails with `AlreadyExists` if its session was already settled.
pub async fn insert_payment(ex: &mut Executor, payment: &Payment) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO payments (id, booking_id, session_id, amount, created)
                VALUES ($1, $2, $3, $4, $5)";
            let done = sqlx::query(query_str)
                .bind(payment.id.to_string())
                .bind(payment.booking_id.to_string())
                .bind(payment.session_id.to_string())
                .bind(payment.amount.as_i64())
                .bind(payment.created)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_secs, created_nsecs) = split_timestamp(payment.created)?;

            let query_str = "
                INSERT INTO payments (
                    id, booking_id, session_id, amount, created_secs, created_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(payment.id.to_string())
                .bind(payment.booking_id.to_string())
                .bind(payment.session_id.to_string())
                .bind(payment.amount.as_i64())
                .bind(created_secs)
                .bind(created_nsecs)
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

/// Gets all payments received for `booking_id`, oldest first.
pub async fn get_booking_payments(
    ex: &mut Executor,
    booking_id: BookingId,
) -> DbResult<Vec<Payment>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM payments WHERE booking_id = $1 ORDER BY created";
            let rows = sqlx::query(query_str)
                .bind(booking_id.to_string())
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Payment::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM payments WHERE booking_id = ?
                ORDER BY created_secs, created_nsecs";
            let rows = sqlx::query(query_str)
                .bind(booking_id.to_string())
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Payment::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Inserts a new `subscription`.
pub async fn insert_subscription(ex: &mut Executor, subscription: &Subscription) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO subscriptions (id, user_id, plan, price, status, created)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(subscription.id.to_string())
                .bind(subscription.user_id.as_str())
                .bind(subscription.plan.as_str())
                .bind(subscription.price.as_i64())
                .bind(subscription.status.as_str())
                .bind(subscription.created)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_secs, created_nsecs) = split_timestamp(subscription.created)?;

            let query_str = "
                INSERT INTO subscriptions (
                    id, user_id, plan, price, status, created_secs, created_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(subscription.id.to_string())
                .bind(subscription.user_id.as_str())
                .bind(subscription.plan.as_str())
                .bind(subscription.price.as_i64())
                .bind(subscription.status.as_str())
                .bind(created_secs)
                .bind(created_nsecs)
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

/// Gets the subscription identified by `id`.
pub async fn get_subscription(ex: &mut Executor, id: SubscriptionId) -> DbResult<Subscription> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM subscriptions WHERE id = $1";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Subscription::try_from(raw)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM subscriptions WHERE id = ?";
            let raw = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Subscription::try_from(raw)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the most recent subscription of `user_id` that is in the `status` state, if any.
pub async fn get_latest_subscription(
    ex: &mut Executor,
    user_id: &UserId,
    status: SubscriptionStatus,
) -> DbResult<Option<Subscription>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT * FROM subscriptions
                WHERE user_id = $1 AND status = $2
                ORDER BY created DESC
                LIMIT 1";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(status.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw.map(Subscription::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT * FROM subscriptions
                WHERE user_id = ? AND status = ?
                ORDER BY created_secs DESC, created_nsecs DESC
                LIMIT 1";
            let raw = sqlx::query(query_str)
                .bind(user_id.as_str())
                .bind(status.as_str())
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw.map(Subscription::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Changes the state of the subscription `id` to `status`.
pub async fn set_subscription_status(
    ex: &mut Executor,
    id: SubscriptionId,
    status: SubscriptionStatus,
) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "UPDATE subscriptions SET status = $1 WHERE id = $2";
            let done = sqlx::query(query_str)
                .bind(status.as_str())
                .bind(id.to_string())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "UPDATE subscriptions SET status = ? WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(status.as_str())
                .bind(id.to_string())
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
