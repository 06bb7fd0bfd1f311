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

//! Sources of the current time.
//!
//! Business logic never queries the system time directly.  It receives a `Clock` instead so that
//! tests can pin "now" to a known instant and move it around.

use time::{Date, OffsetDateTime};

/// Source of the current time.
pub trait Clock {
    /// Returns the current time in UTC.
    fn now_utc(&self) -> OffsetDateTime;

    /// Returns the current date in UTC.
    fn today(&self) -> Date {
        self.now_utc().date()
    }
}

/// Drops the sub-microsecond part of `ts`, which PostgreSQL cannot store.
fn truncate_to_micros(ts: OffsetDateTime) -> OffsetDateTime {
    let micros = ts.microsecond();
    // Cannot fail: the microsecond count of a valid timestamp is always in range.
    ts.replace_microsecond(micros).unwrap_or(ts)
}

/// Clock backed by the system time.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        truncate_to_micros(OffsetDateTime::now_utc())
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Clock that stays still until told to move.
    pub struct SettableClock {
        /// The time to return.
        now: Mutex<OffsetDateTime>,
    }

    /// Ensures `now` can be stored in the database without losing precision.
    fn check_micros(now: OffsetDateTime) -> OffsetDateTime {
        assert_eq!(now, truncate_to_micros(now), "Clock only supports microsecond precision");
        now
    }

    impl SettableClock {
        /// Creates a clock frozen at `now`.
        pub fn new(now: OffsetDateTime) -> Self {
            Self { now: Mutex::new(check_micros(now)) }
        }

        /// Moves the clock to `now`, which can be in the past.
        pub fn set(&self, now: OffsetDateTime) {
            *self.now.lock().unwrap() = check_micros(now);
        }

        /// Moves the clock forward by `delta`.
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = check_micros(*now + delta);
        }

        /// Moves the clock forward by `days` whole days.
        pub fn advance_days(&self, days: u64) {
            self.advance(Duration::from_secs(days * 86400));
        }
    }

    impl Clock for SettableClock {
        fn now_utc(&self) -> OffsetDateTime {
            *self.now.lock().unwrap()
        }
    }

}
