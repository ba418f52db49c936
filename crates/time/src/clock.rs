// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for reading wall time in milliseconds

/// A clock that provides the current time as epoch milliseconds
pub trait Clock: Clone + Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that follows [`crate::timers::now`], so it reads fake time while
/// a [`crate::FakeTime`] intercepts and real time otherwise
#[derive(Clone, Default)]
pub struct GlobalClock;

impl Clock for GlobalClock {
    fn now_ms(&self) -> i64 {
        crate::timers::now()
    }
}

/// Returns a probe that reports milliseconds elapsed on `clock` since the
/// probe was created
pub fn from_now<C: Clock>(clock: C) -> impl Fn() -> i64 {
    let start = clock.now_ms();
    move || clock.now_ms() - start
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
