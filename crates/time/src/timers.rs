// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer entry points that follow the installed fake clock
//!
//! While a [`FakeTime`](crate::FakeTime) is installed and intercepting,
//! these schedule on the fake clock. Otherwise, including inside
//! [`FakeTime::restore_for`](crate::FakeTime::restore_for), they spawn real
//! timers on the current tokio runtime.

use crate::clock::{Clock, SystemClock};
use crate::error::TimeError;
use crate::fake_time;
use crate::queue::TimerId;
use mimic_mock::Fault;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Abort handles of live real timers. An entry is `None` only while its task
/// is being spawned.
static REAL_TIMERS: Mutex<BTreeMap<u64, Option<AbortHandle>>> = Mutex::new(BTreeMap::new());
static NEXT_REAL_ID: AtomicU64 = AtomicU64::new(1);

/// What a timer callback produced.
///
/// Plain callbacks return `()`; fallible ones return `Result<_, Fault>`.
pub trait Completion {
    fn into_result(self) -> Result<(), Fault>;
}

impl Completion for () {
    fn into_result(self) -> Result<(), Fault> {
        Ok(())
    }
}

impl<T> Completion for Result<T, Fault> {
    fn into_result(self) -> Result<(), Fault> {
        self.map(|_| ())
    }
}

/// A timer on either the fake clock or the tokio runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerHandle {
    Fake(TimerId),
    Real(u64),
}

/// Current time in epoch milliseconds
pub fn now() -> i64 {
    match fake_time::intercepting() {
        Some(clock) => clock.now(),
        None => SystemClock.now_ms(),
    }
}

/// Call `callback` once after `delay`
pub fn set_timeout<F, O>(callback: F, delay: Duration) -> Result<TimerHandle, TimeError>
where
    F: Fn() -> O + Send + 'static,
    O: Completion + Send + 'static,
{
    schedule(callback, delay, false)
}

/// Call `callback` every `delay`, starting after the first `delay`
pub fn set_interval<F, O>(callback: F, delay: Duration) -> Result<TimerHandle, TimeError>
where
    F: Fn() -> O + Send + 'static,
    O: Completion + Send + 'static,
{
    schedule(callback, delay, true)
}

/// Cancel a timer. Unknown or already fired timers are ignored.
pub fn clear_timeout(handle: TimerHandle) {
    match handle {
        TimerHandle::Fake(id) => {
            if let Some(clock) = fake_time::installed() {
                clock.cancel(id);
            }
        }
        TimerHandle::Real(id) => {
            let task = real_timers().remove(&id).flatten();
            if let Some(task) = task {
                task.abort();
            }
        }
    }
}

pub fn clear_interval(handle: TimerHandle) {
    clear_timeout(handle);
}

fn schedule<F, O>(callback: F, delay: Duration, repeat: bool) -> Result<TimerHandle, TimeError>
where
    F: Fn() -> O + Send + 'static,
    O: Completion + Send + 'static,
{
    if let Some(clock) = fake_time::intercepting() {
        return Ok(TimerHandle::Fake(clock.schedule(callback, delay, repeat)));
    }
    spawn_real(callback, delay, repeat).map(TimerHandle::Real)
}

fn spawn_real<F, O>(callback: F, delay: Duration, repeat: bool) -> Result<u64, TimeError>
where
    F: Fn() -> O + Send + 'static,
    O: Completion + Send + 'static,
{
    let runtime = Handle::try_current().map_err(|_| TimeError::NoRuntime)?;
    let id = NEXT_REAL_ID.fetch_add(1, Ordering::SeqCst);

    // Reserve the entry first; if the task ends before its handle is
    // stored, the registration has already removed the entry and the
    // handle is discarded
    real_timers().insert(id, None);
    let registration = Registration(id);
    let task = runtime.spawn(async move {
        let _registration = registration;
        if repeat {
            let period = delay.max(Duration::from_millis(1));
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                report(id, callback().into_result());
            }
        } else {
            tokio::time::sleep(delay).await;
            report(id, callback().into_result());
        }
    });
    if let Some(slot) = real_timers().get_mut(&id) {
        *slot = Some(task.abort_handle());
    }
    tracing::trace!(id, ?delay, repeat, "scheduled real timer");
    Ok(id)
}

fn report(id: u64, outcome: Result<(), Fault>) {
    if let Err(fault) = outcome {
        tracing::error!(id, error = %fault, "real timer callback failed");
    }
}

/// Removes a real timer's entry when its task ends, is aborted, or is
/// dropped with its runtime
struct Registration(u64);

impl Drop for Registration {
    fn drop(&mut self) {
        real_timers().remove(&self.0);
    }
}

fn real_timers() -> MutexGuard<'static, BTreeMap<u64, Option<AbortHandle>>> {
    REAL_TIMERS.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
fn is_registered(id: u64) -> bool {
    real_timers().contains_key(&id)
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
