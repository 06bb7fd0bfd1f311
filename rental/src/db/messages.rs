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

//! Queries for the support chat.

use crate::model::{Message, MessageBody, MessageId, Sender, UserId};
#[cfg(feature = "postgres")]
use autorent_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use autorent_core::db::sqlite::{self, split_timestamp};
use autorent_core::db::{DbError, DbResult, Executor};
use sqlx::Row;

impl_from_row!(Message, |row, map_sqlx_error, get_timestamp| {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let customer: String = row.try_get("customer").map_err(map_sqlx_error)?;
    let sender: String = row.try_get("sender").map_err(map_sqlx_error)?;
    let author: String = row.try_get("author").map_err(map_sqlx_error)?;
    let body: String = row.try_get("body").map_err(map_sqlx_error)?;
    let sent = get_timestamp(&row, "sent")?;

    Ok(Message {
        id: MessageId::parse(&id)?,
        customer: UserId::new(customer)?,
        sender: Sender::parse(&sender)?,
        author: UserId::new(author)?,
        body: MessageBody::new(body)?,
        sent,
    })
});

/// Appends `message` to the conversation of its customer.
pub async fn insert_message(ex: &mut Executor, message: &Message) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO messages (id, customer, sender, author, body, sent)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(message.id.to_string())
                .bind(message.customer.as_str())
                .bind(message.sender.as_str())
                .bind(message.author.as_str())
                .bind(message.body.as_str())
                .bind(message.sent)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (sent_secs, sent_nsecs) = split_timestamp(message.sent)?;

            let query_str = "
                INSERT INTO messages (id, customer, sender, author, body, sent_secs, sent_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(message.id.to_string())
                .bind(message.customer.as_str())
                .bind(message.sender.as_str())
                .bind(message.author.as_str())
                .bind(message.body.as_str())
                .bind(sent_secs)
                .bind(sent_nsecs)
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

/// Gets the whole conversation of `customer` in the order in which messages were sent.
pub async fn get_messages(ex: &mut Executor, customer: &UserId) -> DbResult<Vec<Message>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM messages WHERE customer = $1 ORDER BY sent";
            let rows = sqlx::query(query_str)
                .bind(customer.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(Message::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str =
                "SELECT * FROM messages WHERE customer = ? ORDER BY sent_secs, sent_nsecs";
            let rows = sqlx::query(query_str)
                .bind(customer.as_str())
                .fetch_all(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(Message::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
