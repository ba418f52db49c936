// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for fake time

use crate::queue::TimerId;
use mimic_mock::Fault;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while faking time
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("invalid start: {0}")]
    InvalidStart(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("timestamp out of range: {0}")]
    OutOfRange(i64),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fake time config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("no fake time")]
    NoFakeTime,
    #[error("time already restored")]
    AlreadyRestored,
    #[error("real timers need a tokio runtime")]
    NoRuntime,
    #[error("time cannot go backwards: {now} -> {target}")]
    Backwards { now: i64, target: i64 },
    #[error("delay aborted")]
    Aborted,
    #[error("timer {id} callback failed: {fault}")]
    Callback {
        id: TimerId,
        #[source]
        fault: Fault,
    },
}

impl From<TimeError> for Fault {
    fn from(error: TimeError) -> Self {
        Fault::new(error)
    }
}
