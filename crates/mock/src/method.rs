// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replaceable method slots and the interception handles that restore them
//!
//! A [`Method`] is the field an object uses for a member that tests may
//! spy on or stub. Swapping the callable in and putting the original back
//! both happen under the slot's lock, and each [`Interception`] restores
//! exactly once.

use crate::error::{Fault, MockError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A shared callable that may be invoked with or without a receiver
pub type Callable<S, A, R> = Arc<dyn Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync>;

struct SlotState<S, A, R> {
    current: Option<Callable<S, A, R>>,
    configurable: bool,
    intercepted: bool,
}

/// A named member slot holding the callable currently bound to it
pub struct Method<S, A, R> {
    name: Arc<str>,
    state: Arc<Mutex<SlotState<S, A, R>>>,
}

impl<S, A, R> Clone for Method<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, A, R> fmt::Debug for Method<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("callable", &state.current.is_some())
            .field("configurable", &state.configurable)
            .field("intercepted", &state.intercepted)
            .finish()
    }
}

impl<S: 'static, A: 'static, R: 'static> Method<S, A, R> {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync + 'static,
    {
        Self::build(name.into(), Some(Arc::new(func)), true)
    }

    /// A slot that can never be spied on or stubbed
    pub fn sealed<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync + 'static,
    {
        Self::build(name.into(), Some(Arc::new(func)), false)
    }

    /// A slot with nothing callable bound to it
    pub fn vacant(name: impl Into<String>) -> Self {
        Self::build(name.into(), None, true)
    }

    fn build(name: String, current: Option<Callable<S, A, R>>, configurable: bool) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(SlotState {
                current,
                configurable,
                intercepted: false,
            })),
        }
    }
}

impl<S, A, R> Method<S, A, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The callable currently bound to the slot
    pub fn current(&self) -> Option<Callable<S, A, R>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }

    /// Whether a spy or stub is currently installed
    pub fn is_intercepted(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .intercepted
    }

    /// Invoke the bound callable on a receiver
    ///
    /// The slot lock is released before the call, so the callable may
    /// re-enter the slot.
    pub fn invoke(&self, receiver: &S, args: A) -> Result<R, Fault> {
        let Some(callable) = self.current() else {
            return Err(MockError::NotAMethod(self.name.to_string()).into());
        };
        callable(Some(receiver), args)
    }

    /// Swap a proxy into the slot.
    ///
    /// `install` receives the original callable and returns the proxy to
    /// bind plus any value the caller wants back.
    pub(crate) fn intercept<T>(
        &self,
        install: impl FnOnce(Callable<S, A, R>) -> (Callable<S, A, R>, T),
    ) -> Result<(Interception<S, A, R>, T), MockError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let Some(original) = state.current.clone() else {
            return Err(MockError::NotAMethod(self.name.to_string()));
        };
        if state.intercepted {
            return Err(MockError::AlreadySpying(self.name.to_string()));
        }
        if !state.configurable {
            return Err(MockError::NotConfigurable(self.name.to_string()));
        }

        let (proxy, extra) = install(Arc::clone(&original));
        state.current = Some(proxy);
        state.intercepted = true;
        tracing::debug!(member = %self.name, "intercepted method");

        Ok((
            Interception {
                member: Arc::clone(&self.name),
                state: Arc::clone(&self.state),
                original,
                restored: AtomicBool::new(false),
            },
            extra,
        ))
    }
}

/// Handle that puts a slot's original callable back, once
pub(crate) struct Interception<S, A, R> {
    member: Arc<str>,
    state: Arc<Mutex<SlotState<S, A, R>>>,
    original: Callable<S, A, R>,
    restored: AtomicBool,
}

impl<S, A, R> Interception<S, A, R> {
    pub(crate) fn original(&self) -> &Callable<S, A, R> {
        &self.original
    }

    pub(crate) fn is_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }

    pub(crate) fn restore(&self) -> Result<(), MockError> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Err(MockError::AlreadyRestored(self.member.to_string()));
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.current = Some(Arc::clone(&self.original));
        state.intercepted = false;
        tracing::debug!(member = %self.member, "restored method");
        Ok(())
    }
}

#[cfg(test)]
#[path = "method_tests.rs"]
mod tests;
