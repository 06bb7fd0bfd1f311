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

//! Extends the driver with the support chat between customers and staff.

use crate::db;
use crate::driver::{find_user, require_self_or_staff, Driver};
use crate::model::{Message, MessageBody, MessageId, Sender, UserId};
use autorent_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Posts `body` to the conversation of `customer` on behalf of `caller`.
    pub(crate) async fn send_message(
        self,
        caller: &UserId,
        customer: &UserId,
        body: MessageBody,
    ) -> DriverResult<Message> {
        let mut tx = self.db.begin().await?;

        let author = find_user(&mut tx, caller).await?;
        let sender = if caller == customer {
            Sender::Customer
        } else if author.is_staff {
            Sender::Staff
        } else {
            return Err(DriverError::Unauthorized(format!(
                "Cannot post to the conversation of user {}",
                customer.as_str()
            )));
        };
        find_user(&mut tx, customer).await?;

        let message = Message {
            id: MessageId::generate(),
            customer: customer.clone(),
            sender,
            author: author.id,
            body,
            sent: self.clock.now_utc(),
        };
        db::insert_message(tx.ex(), &message).await?;
        tx.commit().await?;
        Ok(message)
    }

    /// Gets the whole conversation of `customer` in the order in which it happened.
    pub(crate) async fn list_messages(
        self,
        caller: &UserId,
        customer: &UserId,
    ) -> DriverResult<Vec<Message>> {
        let mut tx = self.db.begin().await?;
        require_self_or_staff(&mut tx, caller, customer).await?;
        find_user(&mut tx, customer).await?;
        let messages = db::get_messages(tx.ex(), customer).await?;
        tx.commit().await?;
        Ok(messages)
    }
}
