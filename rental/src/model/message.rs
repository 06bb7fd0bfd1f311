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

//! Support chat between customers and staff.

use crate::model::{MessageId, UserId};
use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Maximum length of a message body, in characters.
const MAX_BODY_LENGTH: usize = 2000;

/// Side of the conversation that wrote a message.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The customer who owns the conversation.
    Customer,

    /// A member of the staff.
    Staff,
}

impl Sender {
    /// Returns the textual representation used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::Customer => "customer",
            Sender::Staff => "staff",
        }
    }

    /// Parses the textual representation used in the database.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "customer" => Ok(Sender::Customer),
            "staff" => Ok(Sender::Staff),
            s => Err(ModelError(format!("Unknown message sender '{}'", s))),
        }
    }
}

/// Text of a chat message.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Creates a new body from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ModelError("Message cannot be empty".to_owned()));
        }
        if s.chars().count() > MAX_BODY_LENGTH {
            return Err(ModelError(format!(
                "Message cannot be longer than {} characters",
                MAX_BODY_LENGTH
            )));
        }
        Ok(Self(s))
    }

    /// Returns a string view of the body.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MessageBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MessageBody::new(raw).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// A message in the conversation of a customer with the staff.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Message {
    /// Identifier of the message.
    pub id: MessageId,

    /// Customer that owns the conversation.
    pub customer: UserId,

    /// Side of the conversation that wrote the message.
    pub sender: Sender,

    /// User that wrote the message.
    pub author: UserId,

    /// Text of the message.
    pub body: MessageBody,

    /// When the message was sent.
    #[serde(with = "time::serde::rfc3339")]
    pub sent: OffsetDateTime,
}
