// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Call-recording wrappers around functions and method slots

use crate::error::{Fault, MockError};
use crate::method::{Callable, Interception, Method};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Recorded call to a spy
#[derive(Debug, Clone, PartialEq)]
pub struct SpyCall<A, R, S = ()> {
    pub args: A,
    /// The receiver a method was called on
    pub receiver: Option<S>,
    pub returned: Option<R>,
    pub error: Option<Fault>,
}

impl<A, R, S> SpyCall<A, R, S> {
    /// An expected call with the given arguments and no outcome yet
    pub fn with_args(args: A) -> Self {
        Self {
            args,
            receiver: None,
            returned: None,
            error: None,
        }
    }

    pub fn on(mut self, receiver: S) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn returning(mut self, value: R) -> Self {
        self.returned = Some(value);
        self.error = None;
        self
    }

    pub fn raising(mut self, fault: impl Into<Fault>) -> Self {
        self.error = Some(fault.into());
        self.returned = None;
        self
    }
}

/// Shared call log plus the behaviour a spy forwards to
pub(crate) struct Recorder<A, R, S> {
    target: Callable<S, A, R>,
    calls: Mutex<Vec<SpyCall<A, R, S>>>,
}

impl<A, R, S> Recorder<A, R, S>
where
    A: Clone,
    R: Clone,
    S: Clone,
{
    pub(crate) fn new(target: Callable<S, A, R>) -> Self {
        Self {
            target,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Forward to the target, then append the record.
    ///
    /// The log is not locked during the call, so calls that complete first
    /// are recorded first, even when nested.
    pub(crate) fn invoke(&self, receiver: Option<&S>, args: A) -> Result<R, Fault> {
        let mut call = SpyCall {
            args: args.clone(),
            receiver: receiver.cloned(),
            returned: None,
            error: None,
        };
        let outcome = (self.target)(receiver, args);
        match &outcome {
            Ok(value) => call.returned = Some(value.clone()),
            Err(fault) => call.error = Some(fault.clone()),
        }
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        outcome
    }

    fn calls(&self) -> Vec<SpyCall<A, R, S>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A function or method wrapper that records all calls made to it.
///
/// Clones share the same call log.
pub struct Spy<A, R, S = ()> {
    recorder: Arc<Recorder<A, R, S>>,
    original: Callable<S, A, R>,
    interception: Option<Arc<Interception<S, A, R>>>,
}

impl<A, R, S> Clone for Spy<A, R, S> {
    fn clone(&self) -> Self {
        Self {
            recorder: Arc::clone(&self.recorder),
            original: Arc::clone(&self.original),
            interception: self.interception.clone(),
        }
    }
}

impl<A, R, S> fmt::Debug for Spy<A, R, S>
where
    A: Clone + fmt::Debug,
    R: Clone + fmt::Debug,
    S: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("calls", &self.recorder.calls())
            .field("restored", &self.restored())
            .finish()
    }
}

impl<A, R, S> Spy<A, R, S>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    S: Clone + Send + 'static,
{
    /// Spy on a callable that takes an optional receiver
    pub fn wrap(original: Callable<S, A, R>) -> Self {
        Self {
            recorder: Arc::new(Recorder::new(Arc::clone(&original))),
            original,
            interception: None,
        }
    }

    /// Install a spy into a method slot, keeping the original behaviour
    pub fn on(method: &Method<S, A, R>) -> Result<Self, MockError> {
        let (interception, recorder) = method.intercept(|original| {
            let recorder = Arc::new(Recorder::new(original));
            (proxy(&recorder), recorder)
        })?;
        Ok(Self::intercepting(recorder, interception))
    }

    pub(crate) fn intercepting(
        recorder: Arc<Recorder<A, R, S>>,
        interception: Interception<S, A, R>,
    ) -> Self {
        Self {
            original: Arc::clone(interception.original()),
            recorder,
            interception: Some(Arc::new(interception)),
        }
    }

    /// Call without a receiver
    pub fn call(&self, args: A) -> Result<R, Fault> {
        self.recorder.invoke(None, args)
    }

    /// Call as a method on `receiver`
    pub fn call_on(&self, receiver: &S, args: A) -> Result<R, Fault> {
        self.recorder.invoke(Some(receiver), args)
    }

    /// A callable that records into this spy
    pub fn as_callable(&self) -> Callable<S, A, R> {
        proxy(&self.recorder)
    }

    /// Snapshot of all recorded calls, in completion order
    pub fn calls(&self) -> Vec<SpyCall<A, R, S>> {
        self.recorder.calls()
    }

    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }
}

impl<A, R, S> Spy<A, R, S> {
    /// The function being spied on
    pub fn original(&self) -> Callable<S, A, R> {
        Arc::clone(&self.original)
    }

    /// Whether the original method has been put back
    pub fn restored(&self) -> bool {
        self.interception
            .as_ref()
            .is_some_and(|interception| interception.is_restored())
    }

    /// Put the original method back into its slot
    pub fn restore(&self) -> Result<(), MockError> {
        match &self.interception {
            Some(interception) => interception.restore(),
            None => Err(MockError::NotRestorable),
        }
    }
}

impl<A, R> Spy<A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    /// Spy on a plain function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::wrap(Arc::new(move |_: Option<&()>, args: A| {
            Ok::<R, Fault>(func(args))
        }))
    }

    /// Spy on a function that may raise a fault
    pub fn fallible<F>(func: F) -> Self
    where
        F: Fn(A) -> Result<R, Fault> + Send + Sync + 'static,
    {
        Self::wrap(Arc::new(move |_: Option<&()>, args: A| func(args)))
    }
}

impl<A, R> Default for Spy<A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Default + Send + 'static,
{
    /// A spy on a function that does nothing
    fn default() -> Self {
        Self::new(|_| R::default())
    }
}

pub(crate) fn proxy<A, R, S>(recorder: &Arc<Recorder<A, R, S>>) -> Callable<S, A, R>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
    S: Clone + Send + 'static,
{
    let recorder = Arc::clone(recorder);
    Arc::new(move |receiver: Option<&S>, args: A| recorder.invoke(receiver, args))
}

#[cfg(test)]
#[path = "spy_tests.rs"]
mod tests;
