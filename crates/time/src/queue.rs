// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Due-time ordered timer queue
//!
//! Timers are grouped into buckets keyed by their exact due time. Within a
//! bucket they fire in registration order. Cancelling drops the timer from
//! the live index; stale entries are purged once they reach the front of
//! the queue, so the earliest stored timer is always live.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Identifier handed out when a timer is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled timer
#[derive(Debug, Clone)]
pub struct Timer<T> {
    pub id: TimerId,
    pub due: i64,
    /// Refire interval for repeating timers
    pub period: Option<u64>,
    pub payload: T,
}

/// Timers ordered by due time, then by registration
#[derive(Debug)]
pub struct DueQueue<T> {
    buckets: BTreeMap<i64, VecDeque<Timer<T>>>,
    live: HashMap<TimerId, i64>,
    next_id: u64,
}

impl<T> Default for DueQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DueQueue<T> {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            live: HashMap::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` at `due`, refiring every `period` ms if given.
    ///
    /// Periods below 1 are raised to 1 so a repeating timer always moves
    /// forward.
    pub fn schedule(&mut self, due: i64, period: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.insert(Timer {
            id,
            due,
            period: period.map(|period| period.max(1)),
            payload,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let cancelled = self.live.remove(&id).is_some();
        self.prune_front();
        cancelled
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live timers
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The earliest live timer
    pub fn peek(&self) -> Option<&Timer<T>> {
        self.buckets
            .values()
            .next()
            .and_then(VecDeque::front)
            .filter(|timer| self.is_live(timer))
    }

    pub fn peek_due(&self) -> Option<i64> {
        self.peek().map(|timer| timer.due)
    }

    fn insert(&mut self, timer: Timer<T>) {
        self.live.insert(timer.id, timer.due);
        self.buckets.entry(timer.due).or_default().push_back(timer);
    }

    fn is_live(&self, timer: &Timer<T>) -> bool {
        self.live.get(&timer.id) == Some(&timer.due)
    }

    /// Drop stale timers and empty buckets until the front timer is live
    fn prune_front(&mut self) {
        while let Some(mut bucket) = self.buckets.first_entry() {
            while let Some(timer) = bucket.get().front() {
                if self.live.get(&timer.id) == Some(&timer.due) {
                    return;
                }
                bucket.get_mut().pop_front();
            }
            bucket.remove();
        }
    }
}

impl<T: Clone> DueQueue<T> {
    /// Remove the earliest live timer due at or before `limit`.
    ///
    /// A repeating timer is rescheduled at `due + period` before it is
    /// returned, so the caller may cancel it while handling it.
    pub fn pop_due(&mut self, limit: i64) -> Option<Timer<T>> {
        loop {
            let mut bucket = self.buckets.first_entry()?;
            if *bucket.key() > limit {
                return None;
            }
            let next = bucket.get_mut().pop_front();
            if bucket.get().is_empty() {
                bucket.remove();
            }
            let Some(timer) = next else {
                continue;
            };
            if !self.is_live(&timer) {
                continue;
            }

            match timer.period {
                Some(period) => {
                    let due = timer.due.saturating_add_unsigned(period);
                    self.insert(Timer {
                        id: timer.id,
                        due,
                        period: timer.period,
                        payload: timer.payload.clone(),
                    });
                }
                None => {
                    self.live.remove(&timer.id);
                }
            }
            self.prune_front();
            return Some(timer);
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
