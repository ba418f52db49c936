// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Virtual clock that controls timers scheduled through [`crate::timers`]
//!
//! A [`FakeTime`] is installed for the current thread when it is created.
//! While installed it intercepts [`crate::timers`] and [`crate::FakeDate`],
//! and time only moves when the test advances it. Advancing fires every
//! timer due up to the target in due order, with ties broken by
//! registration order. No internal borrow is held while a callback runs, so
//! callbacks may schedule, cancel, or advance freely.

use crate::clock::{Clock, SystemClock};
use crate::config::{FakeTimeOptions, StartTime};
use crate::error::TimeError;
use crate::queue::{DueQueue, TimerId};
use crate::timers::Completion;
use mimic_mock::Fault;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

type Callback = Rc<dyn Fn() -> Result<(), Fault>>;

thread_local! {
    static INSTALLED: RefCell<Option<Rc<State>>> = const { RefCell::new(None) };
    static SUSPENDED: Cell<u32> = const { Cell::new(0) };
}

/// Clock state shared between the owning [`FakeTime`] and the thread registry
pub(crate) struct State {
    start: i64,
    now: Cell<i64>,
    queue: RefCell<DueQueue<Callback>>,
    installed: Cell<bool>,
    options: FakeTimeOptions,
}

impl State {
    pub(crate) fn now(&self) -> i64 {
        self.now.get()
    }

    fn is_intercepting(&self) -> bool {
        self.installed.get() && SUSPENDED.with(Cell::get) == 0
    }

    pub(crate) fn schedule<F, O>(&self, callback: F, delay: Duration, repeat: bool) -> TimerId
    where
        F: Fn() -> O + 'static,
        O: Completion + 'static,
    {
        let delay = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let delay = if repeat { delay.max(1) } else { delay };
        let due = self.now.get().saturating_add_unsigned(delay);
        let period = repeat.then_some(delay);
        let callback: Callback = Rc::new(move || callback().into_result());
        let id = self.queue.borrow_mut().schedule(due, period, callback);
        tracing::trace!(%id, due, repeat, "scheduled fake timer");
        id
    }

    pub(crate) fn cancel(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().cancel(id)
    }

    fn advance_to(&self, target: i64) -> Result<(), TimeError> {
        let now = self.now.get();
        if target < now {
            return Err(TimeError::Backwards { now, target });
        }
        loop {
            let next = self.queue.borrow_mut().pop_due(target);
            let Some(timer) = next else {
                break;
            };
            self.now.set(timer.due);
            tracing::trace!(id = %timer.id, due = timer.due, "firing fake timer");
            (timer.payload)().map_err(|fault| TimeError::Callback {
                id: timer.id,
                fault,
            })?;
        }
        // A callback may have advanced past `target` already
        self.now.set(target.max(self.now.get()));
        Ok(())
    }

}

/// Suspends interception on this thread until dropped, whether the
/// suspended future finished, was cancelled, or panicked.
///
/// Holds no clock state so futures awaiting under it stay `Send`.
struct Suspension(());

impl Suspension {
    fn enter() -> Self {
        let depth = SUSPENDED.with(|suspended| {
            suspended.set(suspended.get() + 1);
            suspended.get()
        });
        tracing::debug!(depth, "suspended fake time");
        Self(())
    }
}

impl Drop for Suspension {
    fn drop(&mut self) {
        let depth = SUSPENDED.with(|suspended| {
            suspended.set(suspended.get().saturating_sub(1));
            suspended.get()
        });
        if depth == 0 {
            tracing::debug!("resumed fake time");
        }
    }
}

/// The clock installed on this thread, if any
pub(crate) fn installed() -> Option<Rc<State>> {
    INSTALLED.with(|slot| slot.borrow().clone())
}

/// The installed clock, if it is currently intercepting
pub(crate) fn intercepting() -> Option<Rc<State>> {
    installed().filter(|state| state.is_intercepting())
}

fn require() -> Result<Rc<State>, TimeError> {
    installed().ok_or(TimeError::NoFakeTime)
}

/// A fake clock installed for the current thread.
///
/// Only one fake clock is installed per thread. Creating another restores
/// the previous one first. Dropping an installed clock restores it.
pub struct FakeTime {
    state: Rc<State>,
}

impl FakeTime {
    /// Install a fake clock starting at the current real time
    pub fn new() -> Self {
        Self::install(SystemClock.now_ms(), FakeTimeOptions::default())
    }

    pub fn with_start(start: impl Into<StartTime>) -> Result<Self, TimeError> {
        let start = start.into().to_millis()?;
        Ok(Self::install(start, FakeTimeOptions::default()))
    }

    pub fn with_options(options: FakeTimeOptions) -> Result<Self, TimeError> {
        let start = match &options.start {
            Some(start) => start.to_millis()?,
            None => SystemClock.now_ms(),
        };
        Ok(Self::install(start, options))
    }

    fn install(start: i64, options: FakeTimeOptions) -> Self {
        let rate = options.effective_rate();
        let state = Rc::new(State {
            start,
            now: Cell::new(start),
            queue: RefCell::new(DueQueue::new()),
            installed: Cell::new(true),
            options,
        });
        let previous = INSTALLED.with(|slot| slot.borrow_mut().replace(Rc::clone(&state)));
        if let Some(previous) = previous {
            previous.installed.set(false);
            tracing::warn!(
                previous_start = previous.start,
                previous_now = previous.now.get(),
                "already using fake time, restored the previous clock"
            );
        }
        tracing::debug!(start, "installed fake time");
        if rate > 0.0 {
            tracing::debug!(
                rate,
                "advance rate set, clock moves only while auto_advance is awaited"
            );
        }
        Self { state }
    }

    /// Current fake time in epoch milliseconds
    pub fn now(&self) -> i64 {
        self.state.now.get()
    }

    /// Fake time the clock started at
    pub fn start(&self) -> i64 {
        self.state.start
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.state.queue.borrow().len()
    }

    pub fn is_installed(&self) -> bool {
        self.state.installed.get()
    }

    pub fn options(&self) -> &FakeTimeOptions {
        &self.state.options
    }

    /// Move the clock to `target`, firing every timer due on the way.
    ///
    /// If a callback fails, advancing stops with [`TimeError::Callback`].
    /// The clock is left at that timer's due time and later timers stay
    /// queued.
    pub fn set_now(&self, target: i64) -> Result<(), TimeError> {
        self.state.advance_to(target)
    }

    /// Advance the clock by `duration`
    pub fn tick(&self, duration: Duration) -> Result<(), TimeError> {
        let ms = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.set_now(self.now().saturating_add(ms))
    }

    /// Advance to the next due time, firing the timers due then.
    /// Returns false when nothing is scheduled.
    pub fn next(&self) -> Result<bool, TimeError> {
        let due = self.state.queue.borrow().peek_due();
        match due {
            Some(due) => {
                self.set_now(due.max(self.now()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advance until no timers remain. Never returns while an interval is
    /// still scheduled.
    pub fn run_all(&self) -> Result<(), TimeError> {
        while self.next()? {}
        Ok(())
    }

    /// Let ready runtime tasks run on real time before continuing
    pub async fn run_microtasks(&self) {
        let _suspension = Suspension::enter();
        tokio::time::sleep(Duration::ZERO).await;
    }

    pub async fn tick_async(&self, duration: Duration) -> Result<(), TimeError> {
        self.run_microtasks().await;
        self.tick(duration)
    }

    pub async fn next_async(&self) -> Result<bool, TimeError> {
        self.run_microtasks().await;
        self.next()
    }

    pub async fn run_all_async(&self) -> Result<(), TimeError> {
        loop {
            self.run_microtasks().await;
            if !self.next()? {
                return Ok(());
            }
        }
    }

    /// Advance the clock against real time until it is restored.
    ///
    /// Every `advance_frequency` of real time, the clock ticks by
    /// `advance_rate * advance_frequency`. Returns at once when the rate
    /// is zero.
    pub async fn auto_advance(&self) -> Result<(), TimeError> {
        let options = &self.state.options;
        if options.effective_rate() <= 0.0 {
            return Ok(());
        }
        let frequency = options.advance_frequency.max(Duration::from_millis(1));
        let step = options.advance_step();
        while self.is_installed() {
            tokio::time::sleep(frequency).await;
            if !self.is_installed() {
                break;
            }
            self.tick(step)?;
        }
        Ok(())
    }

    /// Uninstall the clock so real time is used again
    pub fn restore(&self) -> Result<(), TimeError> {
        if !self.state.installed.replace(false) {
            return Err(TimeError::AlreadyRestored);
        }
        let removed = INSTALLED.with(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.as_ref() {
                Some(current) if Rc::ptr_eq(current, &self.state) => slot.take(),
                _ => None,
            }
        });
        drop(removed);
        tracing::debug!(now = self.state.now.get(), "restored real time");
        Ok(())
    }

    /// Run `future` against real time, then resume faking time
    pub async fn restore_for<F: Future>(future: F) -> Result<F::Output, TimeError> {
        if installed().is_none() {
            return Err(TimeError::NoFakeTime);
        }
        let _suspension = Suspension::enter();
        Ok(future.await)
    }

    /// Current time of the installed fake clock
    pub fn now_ms() -> Result<i64, TimeError> {
        Ok(require()?.now())
    }

    /// Schedule a one-shot timer on the installed fake clock
    pub fn set_timeout<F, O>(callback: F, delay: Duration) -> Result<TimerId, TimeError>
    where
        F: Fn() -> O + 'static,
        O: Completion + 'static,
    {
        Ok(require()?.schedule(callback, delay, false))
    }

    pub fn clear_timeout(id: TimerId) -> Result<(), TimeError> {
        require()?.cancel(id);
        Ok(())
    }

    /// Schedule a repeating timer on the installed fake clock
    pub fn set_interval<F, O>(callback: F, delay: Duration) -> Result<TimerId, TimeError>
    where
        F: Fn() -> O + 'static,
        O: Completion + 'static,
    {
        Ok(require()?.schedule(callback, delay, true))
    }

    pub fn clear_interval(id: TimerId) -> Result<(), TimeError> {
        Self::clear_timeout(id)
    }
}

impl Default for FakeTime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FakeTime {
    fn drop(&mut self) {
        if self.is_installed() {
            let _ = self.restore();
        }
    }
}

impl fmt::Debug for FakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTime")
            .field("start", &self.start())
            .field("now", &self.now())
            .field("pending", &self.pending())
            .field("installed", &self.is_installed())
            .finish()
    }
}

#[cfg(test)]
#[path = "fake_time_tests.rs"]
mod tests;
