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

//! High-level data types of the rental service.

mod booking;
pub use booking::{
    Booking, BookingPhase, BookingRequest, BookingStatus, ClassifiedBookings, Extras,
};
mod car;
pub use car::{Car, CarFilter, CarPatch, CarRegistration};
mod customer;
pub use customer::{Customer, CustomerProfile};
mod ids;
pub use ids::{
    BookingId, MessageId, PaymentId, PaymentSessionId, PromotionId, ReviewId, SubscriptionId,
};
mod message;
pub use message::{Message, MessageBody, Sender};
mod money;
pub use money::{Cents, Percent, Rating};
mod payment;
pub use payment::{
    Payment, PaymentPurpose, PaymentSession, PaymentSessionStatus, Subscription,
    SubscriptionStatus, GOLDEN_PLAN,
};
mod promotion;
pub use promotion::{Audience, NewPromotion, Promotion, PromotionKind, RedeemStatus};
mod review;
pub use review::{Review, ReviewRequest};
mod user;
pub use user::{EmailAddress, User, UserId, UserSettings};
