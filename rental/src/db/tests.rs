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

//! Common tests for any database implementation.

use crate::db::*;
use crate::model::*;
use autorent_core::db::{Db, DbError, Executor};
use std::sync::Arc;
use time::macros::{date, datetime};
use time::Date;

async fn add_customer(ex: &mut Executor, id: &'static str) -> UserId {
    let user = User {
        id: UserId::from(id),
        name: format!("Name of {}", id),
        email: EmailAddress::new(format!("{}@example.com", id)).unwrap(),
        is_staff: false,
    };
    put_user(ex, &user).await.unwrap();

    let profile = CustomerProfile {
        phone: "555-0100".to_owned(),
        license_number: format!("L-{}", id),
        license_expiry: date!(2030 - 01 - 01),
        address: "1 Main Street".to_owned(),
    };
    put_customer_profile(ex, &user.id, &profile).await.unwrap();

    user.id
}

fn new_car(registration: &'static str, price_per_day: i64) -> Car {
    Car {
        registration: CarRegistration::from(registration),
        make: "Seat".to_owned(),
        model: "Ibiza".to_owned(),
        trim: "FR".to_owned(),
        year: 2024,
        color: "red".to_owned(),
        available: true,
        disabled: false,
        price_per_day: Cents::new(price_per_day).unwrap(),
        pictures: vec!["https://example.com/1.jpg".to_owned()],
        categories: vec!["compact".to_owned()],
        average_rating: None,
    }
}

fn new_booking(user_id: &UserId, car: &Car, start_date: Date, end_date: Date) -> Booking {
    Booking {
        id: BookingId::generate(),
        user_id: user_id.clone(),
        car: car.registration.clone(),
        start_date,
        end_date,
        extras: Extras { gps: true, ..Default::default() },
        promotion_id: None,
        total_cost: Cents::new(10000).unwrap(),
        paid: Cents::ZERO,
        status: BookingStatus::Pending,
        pickup_location: "Airport".to_owned(),
        dropoff_location: "Downtown".to_owned(),
        created: datetime!(2026-03-01 10:00:00.000001 UTC),
        review_id: None,
    }
}

fn new_promotion(title: &str, valid_from: Date, valid_until: Date) -> Promotion {
    Promotion {
        id: PromotionId::generate(),
        title: title.to_owned(),
        description: "Some savings".to_owned(),
        image_url: None,
        kind: PromotionKind::Discount,
        value: Some(15),
        valid_from,
        valid_until,
        audience: Audience::Specific,
        targets: vec!["compact".to_owned(), "1234ABC".to_owned()],
        golden_only: false,
    }
}

async fn test_users_put_get(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = UserId::from("alice");
    assert_eq!(DbError::NotFound, get_user(&mut ex, &id).await.unwrap_err());

    let mut user = User {
        id: id.clone(),
        name: "Alice".to_owned(),
        email: EmailAddress::from("alice@example.com"),
        is_staff: false,
    };
    put_user(&mut ex, &user).await.unwrap();
    assert_eq!(user, get_user(&mut ex, &id).await.unwrap());

    user.name = "Alice Smith".to_owned();
    user.is_staff = true;
    put_user(&mut ex, &user).await.unwrap();
    assert_eq!(user, get_user(&mut ex, &id).await.unwrap());
}

async fn test_customers_profile_points_membership(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "bob").await;
    let customer = get_customer(&mut ex, &id).await.unwrap();
    assert_eq!("L-bob", customer.license_number);
    assert_eq!(0, customer.reward_points);
    assert!(!customer.golden_member);
    assert_eq!(None, customer.subscription_plan);

    let profile = CustomerProfile {
        phone: "555-0199".to_owned(),
        license_number: "NEW".to_owned(),
        license_expiry: date!(2031 - 05 - 06),
        address: "2 Side Street".to_owned(),
    };
    put_customer_profile(&mut ex, &id, &profile).await.unwrap();
    add_reward_points(&mut ex, &id, 50).await.unwrap();
    add_reward_points(&mut ex, &id, 7).await.unwrap();
    set_membership(&mut ex, &id, true, Some(GOLDEN_PLAN)).await.unwrap();

    let customer = get_customer(&mut ex, &id).await.unwrap();
    assert_eq!("555-0199", customer.phone);
    assert_eq!(date!(2031 - 05 - 06), customer.license_expiry);
    assert_eq!(57, customer.reward_points);
    assert!(customer.golden_member);
    assert_eq!(Some(GOLDEN_PLAN.to_owned()), customer.subscription_plan);

    set_membership(&mut ex, &id, false, None).await.unwrap();
    let customer = get_customer(&mut ex, &id).await.unwrap();
    assert!(!customer.golden_member);
    assert_eq!(None, customer.subscription_plan);
}

async fn test_customers_missing(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = UserId::from("ghost");
    assert_eq!(DbError::NotFound, get_customer(&mut ex, &id).await.unwrap_err());
    assert_eq!(DbError::NotFound, add_reward_points(&mut ex, &id, 1).await.unwrap_err());
    assert_eq!(DbError::NotFound, set_membership(&mut ex, &id, true, None).await.unwrap_err());
}

async fn test_settings_put_get(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "carol").await;
    assert_eq!(None, get_settings(&mut ex, &id).await.unwrap());

    let mut settings =
        UserSettings { dark_mode: true, language: "es".to_owned(), currency: "EUR".to_owned() };
    put_settings(&mut ex, &id, &settings).await.unwrap();
    assert_eq!(Some(settings.clone()), get_settings(&mut ex, &id).await.unwrap());

    settings.dark_mode = false;
    put_settings(&mut ex, &id, &settings).await.unwrap();
    assert_eq!(Some(settings), get_settings(&mut ex, &id).await.unwrap());
}

async fn test_cars_insert_get_update(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let mut car = new_car("1234ABC", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    assert_eq!(DbError::AlreadyExists, insert_car(&mut ex, &car).await.unwrap_err());
    assert_eq!(car, get_car(&mut ex, &car.registration).await.unwrap());

    car.available = false;
    car.price_per_day = Cents::new(6000).unwrap();
    update_car(&mut ex, &car).await.unwrap();
    assert_eq!(car, get_car(&mut ex, &car.registration).await.unwrap());

    set_car_rating(&mut ex, &car.registration, Some(4.5)).await.unwrap();
    assert_eq!(Some(4.5), get_car(&mut ex, &car.registration).await.unwrap().average_rating);
    set_car_rating(&mut ex, &car.registration, None).await.unwrap();
    assert_eq!(None, get_car(&mut ex, &car.registration).await.unwrap().average_rating);

    let missing = new_car("0000ZZZ", 1);
    assert_eq!(DbError::NotFound, get_car(&mut ex, &missing.registration).await.unwrap_err());
    assert_eq!(DbError::NotFound, update_car(&mut ex, &missing).await.unwrap_err());
}

async fn test_cars_enabled_only(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let car1 = new_car("BBB111", 1000);
    let mut car2 = new_car("AAA222", 2000);
    car2.available = false;
    let mut car3 = new_car("CCC333", 3000);
    car3.disabled = true;
    for car in [&car1, &car2, &car3] {
        insert_car(&mut ex, car).await.unwrap();
    }

    assert_eq!(vec![car2, car1], get_enabled_cars(&mut ex).await.unwrap());
}

async fn test_promotions_insert_get(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let promo1 = new_promotion("Spring", date!(2026 - 03 - 01), date!(2026 - 05 - 31));
    let mut promo2 = new_promotion("Weekend", date!(2026 - 04 - 01), date!(2026 - 04 - 30));
    promo2.kind = PromotionKind::Upgrade;
    promo2.value = None;
    promo2.audience = Audience::All;
    promo2.targets = vec![];
    promo2.image_url = Some("https://example.com/w.png".to_owned());
    promo2.golden_only = true;
    insert_promotion(&mut ex, &promo1).await.unwrap();
    insert_promotion(&mut ex, &promo2).await.unwrap();

    assert_eq!(promo1, get_promotion(&mut ex, promo1.id).await.unwrap());
    assert_eq!(promo2, get_promotion(&mut ex, promo2.id).await.unwrap());
    assert_eq!(
        DbError::NotFound,
        get_promotion(&mut ex, PromotionId::generate()).await.unwrap_err()
    );

    assert!(get_promotions_valid_on(&mut ex, date!(2026 - 02 - 28)).await.unwrap().is_empty());
    assert_eq!(
        vec![promo1.clone()],
        get_promotions_valid_on(&mut ex, date!(2026 - 03 - 01)).await.unwrap()
    );
    assert_eq!(
        vec![promo2.clone(), promo1.clone()],
        get_promotions_valid_on(&mut ex, date!(2026 - 04 - 30)).await.unwrap()
    );
    assert_eq!(
        vec![promo1],
        get_promotions_valid_on(&mut ex, date!(2026 - 05 - 31)).await.unwrap()
    );
}

async fn test_promotions_redeem_and_use(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "dave").await;
    let promo1 = new_promotion("One", date!(2026 - 01 - 01), date!(2026 - 12 - 31));
    let promo2 = new_promotion("Two", date!(2026 - 01 - 01), date!(2026 - 12 - 31));
    insert_promotion(&mut ex, &promo1).await.unwrap();
    insert_promotion(&mut ex, &promo2).await.unwrap();

    assert!(add_redeemed_promotion(&mut ex, &id, promo1.id).await.unwrap());
    assert!(!add_redeemed_promotion(&mut ex, &id, promo1.id).await.unwrap());
    assert!(add_redeemed_promotion(&mut ex, &id, promo2.id).await.unwrap());

    let customer = get_customer(&mut ex, &id).await.unwrap();
    let mut expected = vec![promo1.id, promo2.id];
    expected.sort_by_key(|id| id.to_string());
    assert_eq!(expected, customer.redeemed_promotions);
    assert!(customer.used_promotions.is_empty());

    mark_promotion_used(&mut ex, &id, promo1.id).await.unwrap();
    assert_eq!(
        DbError::NotFound,
        mark_promotion_used(&mut ex, &id, promo1.id).await.unwrap_err()
    );
    assert!(!add_redeemed_promotion(&mut ex, &id, promo1.id).await.unwrap());

    let customer = get_customer(&mut ex, &id).await.unwrap();
    assert_eq!(vec![promo2.id], customer.redeemed_promotions);
    assert_eq!(vec![promo1.id], customer.used_promotions);
    assert!(customer.has_redeemed(promo1.id));
    assert!(customer.has_redeemed(promo2.id));
}

async fn test_bookings_insert_get(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "erin").await;
    let car = new_car("1234ABC", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    let promo = new_promotion("Spring", date!(2026 - 03 - 01), date!(2026 - 05 - 31));
    insert_promotion(&mut ex, &promo).await.unwrap();

    let mut later = new_booking(&id, &car, date!(2026 - 06 - 10), date!(2026 - 06 - 12));
    later.extras = Extras { insurance: true, gps: false, child_seat: true, chauffeur: true };
    let mut earlier = new_booking(&id, &car, date!(2026 - 04 - 01), date!(2026 - 04 - 05));
    earlier.promotion_id = Some(promo.id);
    insert_booking(&mut ex, &later).await.unwrap();
    insert_booking(&mut ex, &earlier).await.unwrap();

    assert_eq!(later, get_booking(&mut ex, later.id).await.unwrap());
    assert_eq!(
        DbError::NotFound,
        get_booking(&mut ex, BookingId::generate()).await.unwrap_err()
    );
    assert_eq!(vec![earlier, later], get_user_bookings(&mut ex, &id).await.unwrap());

    let other = add_customer(&mut ex, "frank").await;
    assert!(get_user_bookings(&mut ex, &other).await.unwrap().is_empty());
}

async fn test_bookings_unknown_references(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "gina").await;
    let car = new_car("1234ABC", 5000);
    let booking = new_booking(&id, &car, date!(2026 - 06 - 10), date!(2026 - 06 - 12));
    assert_eq!(DbError::NotFound, insert_booking(&mut ex, &booking).await.unwrap_err());
}

async fn test_bookings_overlaps(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "hank").await;
    let car = new_car("1234ABC", 5000);
    let other_car = new_car("5678DEF", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    insert_car(&mut ex, &other_car).await.unwrap();

    let booking = new_booking(&id, &car, date!(2026 - 06 - 10), date!(2026 - 06 - 15));
    insert_booking(&mut ex, &booking).await.unwrap();
    let mut cancelled = new_booking(&id, &car, date!(2026 - 06 - 20), date!(2026 - 06 - 25));
    cancelled.status = BookingStatus::Cancelled;
    insert_booking(&mut ex, &cancelled).await.unwrap();

    let reg = &car.registration;
    for (start, end, expected) in [
        (date!(2026 - 06 - 01), date!(2026 - 06 - 10), 0),
        (date!(2026 - 06 - 01), date!(2026 - 06 - 11), 1),
        (date!(2026 - 06 - 11), date!(2026 - 06 - 12), 1),
        (date!(2026 - 06 - 14), date!(2026 - 06 - 30), 1),
        (date!(2026 - 06 - 15), date!(2026 - 06 - 30), 0),
        (date!(2026 - 06 - 21), date!(2026 - 06 - 22), 0),
    ] {
        assert_eq!(
            expected,
            count_overlapping_bookings(&mut ex, reg, start, end).await.unwrap(),
            "Unexpected overlap count for {} to {}",
            start,
            end
        );
    }

    assert_eq!(
        0,
        count_overlapping_bookings(
            &mut ex,
            &other_car.registration,
            date!(2026 - 06 - 10),
            date!(2026 - 06 - 15)
        )
        .await
        .unwrap()
    );
}

async fn test_bookings_update_status(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "ivan").await;
    let car = new_car("1234ABC", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    let mut booking = new_booking(&id, &car, date!(2026 - 06 - 10), date!(2026 - 06 - 15));
    insert_booking(&mut ex, &booking).await.unwrap();

    booking.paid = Cents::new(2500).unwrap();
    booking.status = BookingStatus::InProgress;
    update_booking_payment(&mut ex, booking.id, booking.paid, booking.status).await.unwrap();
    assert_eq!(booking, get_booking(&mut ex, booking.id).await.unwrap());

    booking.status = BookingStatus::Cancelled;
    set_booking_status(&mut ex, booking.id, booking.status).await.unwrap();
    assert_eq!(booking, get_booking(&mut ex, booking.id).await.unwrap());

    let missing = BookingId::generate();
    assert_eq!(
        DbError::NotFound,
        set_booking_status(&mut ex, missing, BookingStatus::Completed).await.unwrap_err()
    );
    assert_eq!(
        DbError::NotFound,
        update_booking_payment(&mut ex, missing, Cents::ZERO, BookingStatus::Completed)
            .await
            .unwrap_err()
    );
}

async fn test_reviews_one_per_booking(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "judy").await;
    let car = new_car("1234ABC", 5000);
    let other_car = new_car("5678DEF", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    insert_car(&mut ex, &other_car).await.unwrap();
    let booking1 = new_booking(&id, &car, date!(2026 - 01 - 10), date!(2026 - 01 - 15));
    let booking2 = new_booking(&id, &car, date!(2026 - 02 - 10), date!(2026 - 02 - 15));
    insert_booking(&mut ex, &booking1).await.unwrap();
    insert_booking(&mut ex, &booking2).await.unwrap();

    let review1 = Review {
        id: ReviewId::generate(),
        booking_id: booking1.id,
        user_id: id.clone(),
        rating: Rating::new(5).unwrap(),
        comment: "Great".to_owned(),
        created: datetime!(2026-01-16 08:00:00.000010 UTC),
    };
    let review2 = Review {
        id: ReviewId::generate(),
        booking_id: booking2.id,
        user_id: id.clone(),
        rating: Rating::new(2).unwrap(),
        comment: String::new(),
        created: datetime!(2026-02-16 08:00:00.000020 UTC),
    };
    insert_review(&mut ex, &review2).await.unwrap();
    insert_review(&mut ex, &review1).await.unwrap();

    let duplicate = Review { id: ReviewId::generate(), ..review1.clone() };
    assert_eq!(DbError::AlreadyExists, insert_review(&mut ex, &duplicate).await.unwrap_err());

    assert_eq!(
        vec![review1.clone(), review2],
        get_car_reviews(&mut ex, &car.registration).await.unwrap()
    );
    assert!(get_car_reviews(&mut ex, &other_car.registration).await.unwrap().is_empty());

    assert_eq!(Some(review1.id), get_booking(&mut ex, booking1.id).await.unwrap().review_id);
}

async fn test_bookings_delete_cascades(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "kate").await;
    let car = new_car("1234ABC", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    let booking = new_booking(&id, &car, date!(2026 - 01 - 10), date!(2026 - 01 - 15));
    insert_booking(&mut ex, &booking).await.unwrap();

    let session = PaymentSession {
        id: PaymentSessionId::generate(),
        external_id: "cs_test_1".to_owned(),
        checkout_url: "https://pay.example.com/1".to_owned(),
        purpose: PaymentPurpose::Booking(booking.id),
        amount: Cents::new(100).unwrap(),
        status: PaymentSessionStatus::Paid,
        created: datetime!(2026-01-01 00:00:00 UTC),
    };
    insert_payment_session(&mut ex, &session).await.unwrap();
    let payment = Payment {
        id: PaymentId::generate(),
        booking_id: booking.id,
        session_id: session.id,
        amount: session.amount,
        created: datetime!(2026-01-01 00:00:01 UTC),
    };
    insert_payment(&mut ex, &payment).await.unwrap();
    let review = Review {
        id: ReviewId::generate(),
        booking_id: booking.id,
        user_id: id.clone(),
        rating: Rating::new(3).unwrap(),
        comment: "Fine".to_owned(),
        created: datetime!(2026-01-16 00:00:00 UTC),
    };
    insert_review(&mut ex, &review).await.unwrap();

    delete_booking(&mut ex, booking.id).await.unwrap();
    assert_eq!(DbError::NotFound, get_booking(&mut ex, booking.id).await.unwrap_err());
    assert!(get_car_reviews(&mut ex, &car.registration).await.unwrap().is_empty());
    assert!(get_booking_payments(&mut ex, booking.id).await.unwrap().is_empty());
    assert_eq!(
        DbError::NotFound,
        get_payment_session_by_external_id(&mut ex, "cs_test_1").await.unwrap_err()
    );

    assert_eq!(DbError::NotFound, delete_booking(&mut ex, booking.id).await.unwrap_err());
}

async fn test_payments_sessions_and_payments(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "liam").await;
    let car = new_car("1234ABC", 5000);
    insert_car(&mut ex, &car).await.unwrap();
    let booking = new_booking(&id, &car, date!(2026 - 01 - 10), date!(2026 - 01 - 15));
    insert_booking(&mut ex, &booking).await.unwrap();

    let mut session1 = PaymentSession {
        id: PaymentSessionId::generate(),
        external_id: "cs_test_1".to_owned(),
        checkout_url: "https://pay.example.com/1".to_owned(),
        purpose: PaymentPurpose::Booking(booking.id),
        amount: Cents::new(4000).unwrap(),
        status: PaymentSessionStatus::Pending,
        created: datetime!(2026-01-01 00:00:00.000001 UTC),
    };
    let session2 = PaymentSession {
        id: PaymentSessionId::generate(),
        external_id: "cs_test_2".to_owned(),
        amount: Cents::new(6000).unwrap(),
        ..session1.clone()
    };
    insert_payment_session(&mut ex, &session1).await.unwrap();
    insert_payment_session(&mut ex, &session2).await.unwrap();
    let dup = PaymentSession { id: PaymentSessionId::generate(), ..session1.clone() };
    assert_eq!(DbError::AlreadyExists, insert_payment_session(&mut ex, &dup).await.unwrap_err());

    assert_eq!(session1, get_payment_session_by_external_id(&mut ex, "cs_test_1").await.unwrap());
    mark_payment_session_paid(&mut ex, session1.id).await.unwrap();
    session1.status = PaymentSessionStatus::Paid;
    assert_eq!(session1, get_payment_session_by_external_id(&mut ex, "cs_test_1").await.unwrap());
    assert_eq!(
        DbError::NotFound,
        mark_payment_session_paid(&mut ex, PaymentSessionId::generate()).await.unwrap_err()
    );

    let payment2 = Payment {
        id: PaymentId::generate(),
        booking_id: booking.id,
        session_id: session2.id,
        amount: session2.amount,
        created: datetime!(2026-01-03 00:00:00 UTC),
    };
    let payment1 = Payment {
        id: PaymentId::generate(),
        booking_id: booking.id,
        session_id: session1.id,
        amount: session1.amount,
        created: datetime!(2026-01-02 00:00:00 UTC),
    };
    insert_payment(&mut ex, &payment2).await.unwrap();
    insert_payment(&mut ex, &payment1).await.unwrap();
    let dup = Payment { id: PaymentId::generate(), ..payment1.clone() };
    assert_eq!(DbError::AlreadyExists, insert_payment(&mut ex, &dup).await.unwrap_err());

    assert_eq!(vec![payment1, payment2], get_booking_payments(&mut ex, booking.id).await.unwrap());
}

async fn test_payments_subscriptions(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let id = add_customer(&mut ex, "mia").await;
    assert_eq!(
        None,
        get_latest_subscription(&mut ex, &id, SubscriptionStatus::Active).await.unwrap()
    );

    let mut old = Subscription {
        id: SubscriptionId::generate(),
        user_id: id.clone(),
        plan: GOLDEN_PLAN.to_owned(),
        price: Cents::new(2999).unwrap(),
        status: SubscriptionStatus::Pending,
        created: datetime!(2026-01-01 00:00:00 UTC),
    };
    let new = Subscription {
        id: SubscriptionId::generate(),
        created: datetime!(2026-02-01 00:00:00 UTC),
        ..old.clone()
    };
    insert_subscription(&mut ex, &old).await.unwrap();
    insert_subscription(&mut ex, &new).await.unwrap();

    let session = PaymentSession {
        id: PaymentSessionId::generate(),
        external_id: "cs_test_sub".to_owned(),
        checkout_url: "https://pay.example.com/sub".to_owned(),
        purpose: PaymentPurpose::Subscription(new.id),
        amount: new.price,
        status: PaymentSessionStatus::Pending,
        created: datetime!(2026-02-01 00:00:00 UTC),
    };
    insert_payment_session(&mut ex, &session).await.unwrap();
    assert_eq!(session, get_payment_session_by_external_id(&mut ex, "cs_test_sub").await.unwrap());

    assert_eq!(
        Some(new.clone()),
        get_latest_subscription(&mut ex, &id, SubscriptionStatus::Pending).await.unwrap()
    );

    set_subscription_status(&mut ex, old.id, SubscriptionStatus::Active).await.unwrap();
    old.status = SubscriptionStatus::Active;
    assert_eq!(old, get_subscription(&mut ex, old.id).await.unwrap());
    assert_eq!(
        Some(old),
        get_latest_subscription(&mut ex, &id, SubscriptionStatus::Active).await.unwrap()
    );

    assert_eq!(
        DbError::NotFound,
        get_subscription(&mut ex, SubscriptionId::generate()).await.unwrap_err()
    );
    assert_eq!(
        DbError::NotFound,
        set_subscription_status(&mut ex, SubscriptionId::generate(), SubscriptionStatus::Active)
            .await
            .unwrap_err()
    );
}

async fn test_messages_conversation(db: Arc<dyn Db + Send + Sync>) {
    let mut ex = db.ex().await.unwrap();

    let customer = add_customer(&mut ex, "nina").await;
    let other = add_customer(&mut ex, "oscar").await;
    let staff = User {
        id: UserId::from("staff"),
        name: "Staff".to_owned(),
        email: EmailAddress::from("staff@example.com"),
        is_staff: true,
    };
    put_user(&mut ex, &staff).await.unwrap();

    let question = Message {
        id: MessageId::generate(),
        customer: customer.clone(),
        sender: Sender::Customer,
        author: customer.clone(),
        body: MessageBody::new("Can I return the car late?").unwrap(),
        sent: datetime!(2026-05-01 10:00:00.000001 UTC),
    };
    let answer = Message {
        id: MessageId::generate(),
        customer: customer.clone(),
        sender: Sender::Staff,
        author: staff.id.clone(),
        body: MessageBody::new("Yes, until noon.").unwrap(),
        sent: datetime!(2026-05-01 10:00:00.000002 UTC),
    };
    insert_message(&mut ex, &answer).await.unwrap();
    insert_message(&mut ex, &question).await.unwrap();

    assert_eq!(vec![question, answer], get_messages(&mut ex, &customer).await.unwrap());
    assert!(get_messages(&mut ex, &other).await.unwrap().is_empty());
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta] )? ) => {
        autorent_core::db::testutils::generate_tests!(
            $(#[$extra],)?
            $setup,
            $crate::db::tests,
            test_users_put_get,
            test_customers_profile_points_membership,
            test_customers_missing,
            test_settings_put_get,
            test_cars_insert_get_update,
            test_cars_enabled_only,
            test_promotions_insert_get,
            test_promotions_redeem_and_use,
            test_bookings_insert_get,
            test_bookings_unknown_references,
            test_bookings_overlaps,
            test_bookings_update_status,
            test_reviews_one_per_booking,
            test_bookings_delete_cascades,
            test_payments_sessions_and_payments,
            test_payments_subscriptions,
            test_messages_conversation
        );
    }
];

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;
    use crate::db::init_schema;
    use autorent_core::db::postgres::PostgresDb;

    async fn setup() -> PostgresDb {
        let db = autorent_core::db::postgres::testutils::setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(
        Arc::from(setup().await),
        #[ignore = "Requires environment configuration and is expensive"]
    );
}

mod sqlite {
    use super::*;
    use crate::db::init_schema;
    use autorent_core::db::sqlite::SqliteDb;

    async fn setup() -> SqliteDb {
        let db = autorent_core::db::sqlite::testutils::setup().await;
        init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        db
    }

    generate_db_tests!(Arc::from(setup().await));
}
