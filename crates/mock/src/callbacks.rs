// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ready-made fakes for stubs

use crate::error::{Fault, MockError};
use std::sync::Mutex;

/// Returns the receiver the method was called on
pub fn returns_this<S, A>() -> impl Fn(Option<&S>, A) -> Result<Option<S>, Fault> + Send + Sync
where
    S: Clone,
{
    |receiver: Option<&S>, _: A| Ok(receiver.cloned())
}

/// Returns the argument at `index`, if there is one
pub fn returns_arg<S, T>(
    index: usize,
) -> impl Fn(Option<&S>, Vec<T>) -> Result<Option<T>, Fault> + Send + Sync
where
    T: Clone,
{
    move |_: Option<&S>, args: Vec<T>| Ok(args.get(index).cloned())
}

/// Returns the arguments from `start` up to but not including `end`.
///
/// Bounds past the end of the arguments are clamped.
pub fn returns_args<S, T>(
    start: usize,
    end: Option<usize>,
) -> impl Fn(Option<&S>, Vec<T>) -> Result<Vec<T>, Fault> + Send + Sync
where
    T: Clone,
{
    move |_: Option<&S>, args: Vec<T>| {
        let end = end.unwrap_or(args.len()).min(args.len());
        let start = start.min(end);
        Ok(args[start..end].to_vec())
    }
}

/// Raises `fault` on every call
pub fn throws<S, A, R>(
    fault: impl Into<Fault>,
) -> impl Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync {
    let fault = fault.into();
    move |_: Option<&S>, _: A| Err(fault.clone())
}

/// Hands out the next outcome of `outcomes` on each call.
///
/// The cursor cannot be rewound; build a new one to start over. Calling
/// after the sequence is exhausted raises [`MockError::CalledTooOften`].
pub fn returns_next<S, A, R, I>(
    outcomes: I,
) -> impl Fn(Option<&S>, A) -> Result<R, Fault> + Send + Sync
where
    I: IntoIterator<Item = Result<R, Fault>>,
    I::IntoIter: Send,
{
    let cursor = Mutex::new((outcomes.into_iter(), 0usize));
    move |_: Option<&S>, _: A| {
        let mut guard = cursor.lock().unwrap_or_else(|e| e.into_inner());
        let (iter, handed_out) = &mut *guard;
        match iter.next() {
            Some(outcome) => {
                *handed_out += 1;
                outcome
            }
            None => Err(MockError::CalledTooOften {
                expected: *handed_out,
            }
            .into()),
        }
    }
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;
