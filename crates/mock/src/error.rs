// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for spies and stubs

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by spies, stubs, and method slots
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    #[error("property is not an instance method: {0}")]
    NotAMethod(String),
    #[error("already spying on instance method: {0}")]
    AlreadySpying(String),
    #[error("cannot spy on non configurable instance method: {0}")]
    NotConfigurable(String),
    #[error("instance method already restored: {0}")]
    AlreadyRestored(String),
    #[error("function cannot be restored")]
    NotRestorable,
    #[error("no return for call")]
    NoReturn,
    #[error("not expected to be called more than {expected} times")]
    CalledTooOften { expected: usize },
}

/// A value raised by a spied or stubbed callable.
///
/// Faults are shared: the copy stored in a call record and the copy returned
/// to the caller are the same allocation, so [`Fault::ptr_eq`] identifies
/// them. Equality compares messages.
#[derive(Clone)]
pub struct Fault(Arc<anyhow::Error>);

impl Fault {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::new(error)))
    }

    /// Create a fault from a plain message
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self(Arc::new(anyhow::Error::msg(message)))
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// True when the fault wraps the given mock error
    pub fn is_mock(&self, expected: &MockError) -> bool {
        self.downcast_ref::<MockError>() == Some(expected)
    }

    /// Whether both handles refer to the same raised value
    pub fn ptr_eq(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fault").field(&self.0.to_string()).finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.to_string() == other.0.to_string()
    }
}

impl From<MockError> for Fault {
    fn from(error: MockError) -> Self {
        Self::new(error)
    }
}
