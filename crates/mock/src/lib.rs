// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mimic-mock: spies and stubs for Rust tests
//!
//! This crate provides:
//! - [`Spy`]: records arguments, receiver, and outcome of every call
//! - [`Stub`]: replaces a method, optionally with a scripted queue of outcomes
//! - [`Method`]: the replaceable member slot spies and stubs install into
//! - Ready-made fakes in [`callbacks`]

pub mod callbacks;
mod error;
mod method;
mod spy;
mod stub;

pub use callbacks::{returns_arg, returns_args, returns_next, returns_this, throws};
pub use error::{Fault, MockError};
pub use method::{Callable, Method};
pub use spy::{Spy, SpyCall};
pub use stub::Stub;
