// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake time configuration
//!
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! start = "2021-03-31T12:00:00Z"
//! advance_rate = 1.0
//! advance_frequency = "10ms"
//! ```

use crate::date::parse_datetime;
use crate::error::TimeError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_ADVANCE_FREQUENCY: Duration = Duration::from_millis(10);

/// Where a fake clock starts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// A date string, RFC 3339 or RFC 2822
    Text(String),
}

impl StartTime {
    pub fn to_millis(&self) -> Result<i64, TimeError> {
        match self {
            StartTime::Millis(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|_| *ms)
                .ok_or_else(|| TimeError::InvalidStart(ms.to_string())),
            StartTime::Text(text) => parse_datetime(text)
                .map(|date| date.timestamp_millis())
                .ok_or_else(|| TimeError::InvalidStart(text.clone())),
        }
    }
}

impl From<i64> for StartTime {
    fn from(ms: i64) -> Self {
        StartTime::Millis(ms)
    }
}

impl From<&str> for StartTime {
    fn from(text: &str) -> Self {
        StartTime::Text(text.to_string())
    }
}

impl From<String> for StartTime {
    fn from(text: String) -> Self {
        StartTime::Text(text)
    }
}

impl From<DateTime<Utc>> for StartTime {
    fn from(date: DateTime<Utc>) -> Self {
        StartTime::Millis(date.timestamp_millis())
    }
}

/// Options for a fake clock
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FakeTimeOptions {
    /// Initial fake time; the real time when unset
    pub start: Option<StartTime>,
    /// Fake milliseconds per real millisecond when advancing automatically.
    /// Zero keeps the clock still until it is advanced by hand.
    ///
    /// Installing a clock does not start advancing it; the clock only moves
    /// while [`FakeTime::auto_advance`](crate::FakeTime::auto_advance) is
    /// being awaited.
    pub advance_rate: f64,
    /// How often automatic advancing ticks the clock
    #[serde(with = "humantime_serde")]
    pub advance_frequency: Duration,
}

impl Default for FakeTimeOptions {
    fn default() -> Self {
        Self {
            start: None,
            advance_rate: 0.0,
            advance_frequency: DEFAULT_ADVANCE_FREQUENCY,
        }
    }
}

impl FakeTimeOptions {
    pub fn from_toml(text: &str) -> Result<Self, TimeError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let text = std::fs::read_to_string(path).map_err(|source| TimeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn start(mut self, start: impl Into<StartTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn advance_rate(mut self, rate: f64) -> Self {
        self.advance_rate = rate;
        self
    }

    pub fn advance_frequency(mut self, frequency: Duration) -> Self {
        self.advance_frequency = frequency;
        self
    }

    /// The advance rate, with negative and non-finite rates treated as zero
    pub(crate) fn effective_rate(&self) -> f64 {
        if self.advance_rate.is_finite() && self.advance_rate > 0.0 {
            self.advance_rate
        } else {
            0.0
        }
    }

    /// Fake time added on each automatic tick
    pub(crate) fn advance_step(&self) -> Duration {
        let frequency = self.advance_frequency.as_secs_f64();
        Duration::try_from_secs_f64(frequency * self.effective_rate()).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
