// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dates that read the fake clock while it is installed

use crate::error::TimeError;
use crate::timers;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fmt;
use std::ops::Deref;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// A UTC timestamp whose default value is the current (possibly fake) time.
///
/// Read-only queries go to the wrapped [`DateTime`] through `Deref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FakeDate(DateTime<Utc>);

impl FakeDate {
    /// The current time, taken from the fake clock while it intercepts
    pub fn new() -> Self {
        let ms = timers::now();
        Self(DateTime::from_timestamp_millis(ms).unwrap_or(if ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        }))
    }

    pub fn from_millis(ms: i64) -> Result<Self, TimeError> {
        DateTime::from_timestamp_millis(ms)
            .map(Self)
            .ok_or(TimeError::OutOfRange(ms))
    }

    /// Parse an RFC 3339 or RFC 2822 date, or a bare `YYYY-MM-DD` as UTC midnight
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        parse_datetime(text)
            .map(Self)
            .ok_or_else(|| TimeError::InvalidDate(text.to_string()))
    }

    /// Milliseconds since the epoch for a UTC calendar time.
    ///
    /// `month` counts from 0. Fields past their range carry into the next
    /// larger unit, so month 12 is January of the following year.
    pub fn utc(
        year: i32,
        month: i64,
        day: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        millis: i64,
    ) -> Result<i64, TimeError> {
        let out_of_range = || TimeError::InvalidDate(format!("{year}-{month}-{day}"));
        let year = i32::try_from(i64::from(year) + month.div_euclid(12))
            .map_err(|_| out_of_range())?;
        let month = month.rem_euclid(12) as u32 + 1;
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(out_of_range)?;

        [
            (day - 1, MS_PER_DAY),
            (hours, MS_PER_HOUR),
            (minutes, MS_PER_MINUTE),
            (seconds, MS_PER_SECOND),
            (millis, 1),
        ]
        .into_iter()
        .try_fold(first.and_utc().timestamp_millis(), |total, (count, unit)| {
            count.checked_mul(unit).and_then(|ms| total.checked_add(ms))
        })
        .ok_or_else(out_of_range)
    }

    /// The current time in milliseconds, fake while the clock intercepts
    pub fn now() -> i64 {
        timers::now()
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// `2021-03-31T12:00:00.000Z` form
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for FakeDate {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for FakeDate {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for FakeDate {
    fn from(date: DateTime<Utc>) -> Self {
        Self(date)
    }
}

impl From<FakeDate> for DateTime<Utc> {
    fn from(date: FakeDate) -> Self {
        date.0
    }
}

impl fmt::Display for FakeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;
