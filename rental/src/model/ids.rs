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

//! Identifiers of the entities that the service generates itself.

use autorent_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a newtype `$name` over a random UUID.
macro_rules! uuid_id {
    ( $(#[$meta:meta])* $name:ident ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Deserialize, derive_more::Display, Eq, Hash, Ord, PartialEq,
            PartialOrd, Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parses an identifier from its textual representation.
            pub fn parse(s: &str) -> ModelResult<Self> {
                match Uuid::parse_str(s) {
                    Ok(uuid) => Ok(Self(uuid)),
                    Err(e) => Err(ModelError(format!(
                        "Invalid {} '{}': {}",
                        stringify!($name),
                        s,
                        e
                    ))),
                }
            }
        }
    }
}

uuid_id!(
    /// Identifier of a booking.
    BookingId
);

uuid_id!(
    /// Identifier of a chat message.
    MessageId
);

uuid_id!(
    /// Identifier of a payment received for a booking.
    PaymentId
);

uuid_id!(
    /// Identifier of a payment session, as assigned by us and not by the processor.
    PaymentSessionId
);

uuid_id!(
    /// Identifier of a promotion.
    PromotionId
);

uuid_id!(
    /// Identifier of a review.
    ReviewId
);

uuid_id!(
    /// Identifier of a subscription.
    SubscriptionId
);
