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

//! Entry point to the REST server.
//!
//! All APIs except the car catalog, the quote calculator and the payment webhook require the
//! identity of the caller in the `X-User-Id` header, which the authentication gateway in front
//! of this service is responsible for setting.

use crate::driver::Driver;
use autorent_payments::webhook::WebhookOptions;
use axum::Router;
use std::sync::Arc;

mod booking_cancel_post;
mod booking_delete;
mod booking_get;
mod booking_payments_get;
mod booking_payments_post;
mod booking_review_post;
mod bookings_post;
mod car_get;
mod car_patch;
mod car_rating_post;
mod car_reviews_get;
mod cars_get;
mod cars_post;
mod customer_get;
mod customer_put;
mod httputils;
mod messages_get;
mod messages_post;
mod promotions_post;
mod quote_post;
mod settings_get;
mod settings_put;
mod subscription_delete;
mod subscription_post;
#[cfg(test)]
mod testutils;
mod user_bookings_get;
mod user_get;
mod user_promotion_post;
mod user_promotions_get;
mod user_put;
mod webhook_post;

/// Creates the router for the application.
///
/// The `webhook_opts` are used to authenticate the events delivered by the payment processor.
pub(crate) fn app(driver: Driver, webhook_opts: WebhookOptions) -> Router {
    use axum::routing::{get, post};

    let webhook_router = Router::new()
        .route("/webhook", post(webhook_post::handler))
        .with_state((driver.clone(), Arc::from(webhook_opts)));

    let api = Router::new()
        .route("/users/:user", get(user_get::handler).put(user_put::handler))
        .route("/users/:user/bookings", get(user_bookings_get::handler))
        .route("/users/:user/customer", get(customer_get::handler).put(customer_put::handler))
        .route(
            "/users/:user/messages",
            get(messages_get::handler).post(messages_post::handler),
        )
        .route("/users/:user/promotions", get(user_promotions_get::handler))
        .route("/users/:user/promotions/:promotion", post(user_promotion_post::handler))
        .route("/users/:user/settings", get(settings_get::handler).put(settings_put::handler))
        .route(
            "/users/:user/subscription",
            post(subscription_post::handler).delete(subscription_delete::handler),
        )
        .route("/cars", get(cars_get::handler).post(cars_post::handler))
        .route("/cars/:car", get(car_get::handler).patch(car_patch::handler))
        .route("/cars/:car/rating", post(car_rating_post::handler))
        .route("/cars/:car/reviews", get(car_reviews_get::handler))
        .route("/quote", post(quote_post::handler))
        .route("/bookings", post(bookings_post::handler))
        .route("/bookings/:booking", get(booking_get::handler).delete(booking_delete::handler))
        .route("/bookings/:booking/cancel", post(booking_cancel_post::handler))
        .route(
            "/bookings/:booking/payments",
            get(booking_payments_get::handler).post(booking_payments_post::handler),
        )
        .route("/bookings/:booking/review", post(booking_review_post::handler))
        .route("/promotions", post(promotions_post::handler))
        .with_state(driver)
        .merge(webhook_router);

    Router::new().nest("/api/v1", api)
}
