// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mimic-time: deterministic fake time for Rust tests
//!
//! This crate provides:
//! - [`FakeTime`]: a virtual clock that fires timers only when advanced
//! - [`timers`]: timer entry points that follow the installed clock
//! - [`FakeDate`]: timestamps read from the fake clock
//! - [`delay()`]: real-time waits that can be aborted

mod clock;
mod config;
mod date;
mod delay;
mod error;
mod fake_time;
mod queue;
pub mod timers;

#[cfg(test)]
mod test_support;

pub use clock::{from_now, Clock, GlobalClock, SystemClock};
pub use config::{FakeTimeOptions, StartTime};
pub use date::FakeDate;
pub use delay::{delay, AbortController, AbortSignal};
pub use error::TimeError;
pub use fake_time::FakeTime;
pub use queue::{DueQueue, Timer, TimerId};
pub use timers::{Completion, TimerHandle};
