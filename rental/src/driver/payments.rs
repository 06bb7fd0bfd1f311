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

//! Extends the driver with payment collection and reconciliation.

use crate::db;
use crate::driver::{find_booking, require_self_or_staff, Driver};
use crate::model::{
    BookingId, BookingStatus, Cents, Payment, PaymentId, PaymentPurpose, PaymentSession,
    PaymentSessionId, PaymentSessionStatus, SubscriptionId, SubscriptionStatus, UserId,
};
use autorent_core::db::{DbError, TxExecutor};
use autorent_core::driver::{DriverError, DriverResult};
use autorent_payments::webhook::{self, Event, WebhookOptions, WebhookResult};
use autorent_payments::CheckoutRequest;
use log::{info, warn};

impl Driver {
    /// Asks the payment processor for a checkout of `amount` and records it as a pending session
    /// with the given `purpose`.
    pub(super) async fn open_payment_session(
        &self,
        tx: &mut TxExecutor,
        purpose: PaymentPurpose,
        amount: Cents,
        description: String,
    ) -> DriverResult<PaymentSession> {
        let reference = match purpose {
            PaymentPurpose::Booking(id) => id.to_string(),
            PaymentPurpose::Subscription(id) => id.to_string(),
        };
        let request = CheckoutRequest { amount: amount.as_i64(), description, reference };
        let checkout = self.gateway.create_checkout(&request).await.map_err(|e| {
            DriverError::BackendError(format!("Failed to create checkout session: {}", e))
        })?;

        let session = PaymentSession {
            id: PaymentSessionId::generate(),
            external_id: checkout.external_id,
            checkout_url: checkout.url,
            purpose,
            amount,
            status: PaymentSessionStatus::Pending,
            created: self.clock.now_utc(),
        };
        db::insert_payment_session(tx.ex(), &session).await?;
        Ok(session)
    }

    /// Starts the payment of `amount` towards booking `id`, or of its whole outstanding balance
    /// if `amount` is missing.
    pub(crate) async fn create_booking_payment(
        self,
        caller: &UserId,
        id: BookingId,
        amount: Option<Cents>,
    ) -> DriverResult<PaymentSession> {
        let mut tx = self.db.begin().await?;

        let booking = find_booking(&mut tx, id).await?;
        require_self_or_staff(&mut tx, caller, &booking.user_id).await?;
        match booking.status {
            BookingStatus::Cancelled | BookingStatus::Completed => {
                return Err(DriverError::InvalidInput(format!(
                    "Cannot pay for a {} booking",
                    booking.status.as_str()
                )));
            }
            BookingStatus::Pending | BookingStatus::InProgress => (),
        }

        let outstanding = booking.outstanding();
        let amount = amount.unwrap_or(outstanding);
        if amount == Cents::ZERO || amount > outstanding {
            return Err(DriverError::InvalidInput(format!(
                "Payment amount must be positive and at most the outstanding {} cents",
                outstanding.as_i64()
            )));
        }

        let description = format!(
            "Rental of {} from {} to {}",
            booking.car, booking.start_date, booking.end_date
        );
        let session = self
            .open_payment_session(&mut tx, PaymentPurpose::Booking(id), amount, description)
            .await?;
        tx.commit().await?;

        info!(
            "Opened payment session {} for {} cents of booking {}",
            session.external_id,
            amount.as_i64(),
            id
        );
        Ok(session)
    }

    /// Lists the confirmed payments of booking `id`.
    pub(crate) async fn list_booking_payments(
        self,
        caller: &UserId,
        id: BookingId,
    ) -> DriverResult<Vec<Payment>> {
        let mut tx = self.db.begin().await?;
        let booking = find_booking(&mut tx, id).await?;
        require_self_or_staff(&mut tx, caller, &booking.user_id).await?;
        let payments = db::get_booking_payments(tx.ex(), id).await?;
        tx.commit().await?;
        Ok(payments)
    }

    /// Checks that `body` was signed by the payment processor as claimed by the `signature`
    /// header, and not too long ago, and parses it as an event.
    pub(crate) fn verify_webhook(
        &self,
        opts: &WebhookOptions,
        signature: &str,
        body: &[u8],
    ) -> WebhookResult<Event> {
        webhook::verify(opts, signature, body, self.clock.now_utc())?;
        webhook::parse_event(body)
    }

    /// Reconciles the local state after the processor confirms that the session `external_id`
    /// was paid.  `amount` is the amount reported by the processor, if any.
    ///
    /// Confirmations of sessions that were already processed are acknowledged without changes
    /// because the processor may deliver the same event more than once.
    pub(crate) async fn handle_payment_succeeded(
        self,
        external_id: &str,
        amount: Option<Cents>,
    ) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;

        let session = match db::get_payment_session_by_external_id(tx.ex(), external_id).await {
            Ok(session) => session,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!(
                    "Payment session {} not found",
                    external_id
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if session.status == PaymentSessionStatus::Paid {
            info!("Ignoring duplicate confirmation of payment session {}", external_id);
            return Ok(());
        }

        match session.purpose {
            PaymentPurpose::Booking(booking_id) => {
                self.reconcile_booking(&mut tx, &session, booking_id, amount).await?
            }
            PaymentPurpose::Subscription(subscription_id) => {
                activate_subscription(&mut tx, subscription_id).await?
            }
        }

        db::mark_payment_session_paid(tx.ex(), session.id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Records the payment of `session` towards `booking_id` and advances the booking status.
    async fn reconcile_booking(
        &self,
        tx: &mut TxExecutor,
        session: &PaymentSession,
        booking_id: BookingId,
        amount: Option<Cents>,
    ) -> DriverResult<()> {
        let booking = find_booking(tx, booking_id).await?;

        let payment = Payment {
            id: PaymentId::generate(),
            booking_id,
            session_id: session.id,
            amount: amount.unwrap_or(session.amount),
            created: self.clock.now_utc(),
        };
        db::insert_payment(tx.ex(), &payment).await?;

        let mut paid: i64 = 0;
        for payment in db::get_booking_payments(tx.ex(), booking_id).await? {
            paid = paid.checked_add(payment.amount.as_i64()).ok_or_else(|| {
                DriverError::BackendError(format!("Paid amount of booking {} overflows", booking_id))
            })?;
        }
        let paid = Cents::new(paid)?;

        info!("Booking {} received {} cents", booking_id, payment.amount.as_i64());
        let status = settle_status(booking_id, booking.status, paid, booking.total_cost);
        db::update_booking_payment(tx.ex(), booking_id, paid, status).await?;

        if status == BookingStatus::Completed && booking.status != BookingStatus::Completed {
            let points = booking.total_cost.as_i64() / (100 * self.opts.points_per_dollars);
            if points > 0 {
                db::add_reward_points(tx.ex(), &booking.user_id, points).await?;
                info!("Awarded {} points to {}", points, booking.user_id.as_str());
            }
        }

        Ok(())
    }
}

/// Advances the `status` of booking `id` one step at a time until it reflects the cumulative
/// `paid` amount towards its `total` cost.
pub(crate) fn settle_status(
    id: BookingId,
    mut status: BookingStatus,
    paid: Cents,
    total: Cents,
) -> BookingStatus {
    loop {
        let next = status.after_payment(paid, total);
        if next == status {
            return status;
        }
        info!(
            "Booking {} moved from {} to {} with {} of {} cents paid",
            id,
            status.as_str(),
            next.as_str(),
            paid.as_i64(),
            total.as_i64()
        );
        status = next;
    }
}

/// Puts the pending subscription `id` in effect and grants its plan to the subscriber.
async fn activate_subscription(tx: &mut TxExecutor, id: SubscriptionId) -> DriverResult<()> {
    let subscription = match db::get_subscription(tx.ex(), id).await {
        Ok(subscription) => subscription,
        Err(DbError::NotFound) => {
            return Err(DriverError::NotFound(format!("Subscription {} not found", id)));
        }
        Err(e) => return Err(e.into()),
    };

    if subscription.status != SubscriptionStatus::Pending {
        warn!(
            "Payment received for subscription {} in state {}; leaving it untouched",
            id,
            subscription.status.as_str()
        );
        return Ok(());
    }

    db::set_subscription_status(tx.ex(), id, SubscriptionStatus::Active).await?;
    let plan = Some(subscription.plan.as_str());
    db::set_membership(tx.ex(), &subscription.user_id, true, plan).await?;
    info!("Subscription {} of {} is now active", id, subscription.user_id.as_str());
    Ok(())
}
