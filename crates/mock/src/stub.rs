// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Method replacements that record calls and can be scripted

use crate::error::{Fault, MockError};
use crate::method::{Callable, Method};
use crate::spy::{proxy, Recorder, Spy, SpyCall};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type ReturnQueue<R> = Arc<Mutex<VecDeque<Result<R, Fault>>>>;

/// A method replacement that records all calls made to it.
///
/// Queued returns are handed out first, in order; an `Err` entry is raised
/// instead of returned. Once the queue is empty, calls go to the fake.
pub struct Stub<A, R, S = ()> {
    spy: Spy<A, R, S>,
    fake: Callable<S, A, R>,
    returns: ReturnQueue<R>,
}

impl<A, R, S> Clone for Stub<A, R, S> {
    fn clone(&self) -> Self {
        Self {
            spy: self.spy.clone(),
            fake: Arc::clone(&self.fake),
            returns: Arc::clone(&self.returns),
        }
    }
}

impl<A, R, S> Stub<A, R, S>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    S: Clone + Send + 'static,
{
    /// Replace a method with one that returns `R::default()`
    pub fn on(method: &Method<S, A, R>) -> Result<Self, MockError>
    where
        R: Default,
    {
        Self::install(
            method,
            Arc::new(|_: Option<&S>, _: A| Ok::<R, Fault>(R::default())),
            VecDeque::new(),
        )
    }

    /// Replace a method with `fake`
    pub fn with<F>(method: &Method<S, A, R>, fake: F) -> Result<Self, MockError>
    where
        F: Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync + 'static,
    {
        Self::install(method, Arc::new(fake), VecDeque::new())
    }

    /// Replace a method with a fixed script of outcomes.
    ///
    /// Calls past the end of the script raise [`MockError::NoReturn`].
    pub fn returning<I>(method: &Method<S, A, R>, outcomes: I) -> Result<Self, MockError>
    where
        I: IntoIterator<Item = Result<R, Fault>>,
    {
        Self::install(
            method,
            Arc::new(|_: Option<&S>, _: A| {
                Err::<R, Fault>(MockError::NoReturn.into())
            }),
            outcomes.into_iter().collect(),
        )
    }

    fn install(
        method: &Method<S, A, R>,
        fake: Callable<S, A, R>,
        queued: VecDeque<Result<R, Fault>>,
    ) -> Result<Self, MockError> {
        let returns: ReturnQueue<R> = Arc::new(Mutex::new(queued));
        let behaviour = scripted(Arc::clone(&returns), Arc::clone(&fake));
        let (interception, recorder) = method.intercept(move |_original| {
            let recorder = Arc::new(Recorder::new(behaviour));
            (proxy(&recorder), recorder)
        })?;
        Ok(Self {
            spy: Spy::intercepting(recorder, interception),
            fake,
            returns,
        })
    }

    /// Replace any queued outcomes
    pub fn returns<I>(&self, outcomes: I)
    where
        I: IntoIterator<Item = Result<R, Fault>>,
    {
        let mut queue = self.returns.lock().unwrap_or_else(|e| e.into_inner());
        queue.clear();
        queue.extend(outcomes);
    }

    pub fn push_return(&self, value: R) {
        self.returns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(value));
    }

    /// Queue a fault to be raised by a later call
    pub fn push_error(&self, fault: impl Into<Fault>) {
        self.returns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(fault.into()));
    }

    /// Number of queued outcomes not yet handed out
    pub fn pending_returns(&self) -> usize {
        self.returns.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn call(&self, args: A) -> Result<R, Fault> {
        self.spy.call(args)
    }

    pub fn call_on(&self, receiver: &S, args: A) -> Result<R, Fault> {
        self.spy.call_on(receiver, args)
    }

    pub fn calls(&self) -> Vec<SpyCall<A, R, S>> {
        self.spy.calls()
    }

    pub fn call_count(&self) -> usize {
        self.spy.call_count()
    }
}

impl<A, R, S> Stub<A, R, S> {
    /// The function used instead of the original
    pub fn fake(&self) -> Callable<S, A, R> {
        Arc::clone(&self.fake)
    }

    /// The method that was replaced
    pub fn original(&self) -> Callable<S, A, R> {
        self.spy.original()
    }

    /// The recording wrapper behind this stub
    pub fn spy(&self) -> &Spy<A, R, S> {
        &self.spy
    }

    pub fn restored(&self) -> bool {
        self.spy.restored()
    }

    pub fn restore(&self) -> Result<(), MockError> {
        self.spy.restore()
    }
}

/// Hand out queued outcomes first, then defer to `fake`
fn scripted<A, R, S>(returns: ReturnQueue<R>, fake: Callable<S, A, R>) -> Callable<S, A, R>
where
    A: Send + 'static,
    R: Send + 'static,
    S: 'static,
{
    Arc::new(move |receiver: Option<&S>, args: A| {
        // Queue lock is dropped before the fake runs
        let next = returns
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(outcome) => outcome,
            None => fake(receiver, args),
        }
    })
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
