//! Shared fixtures for the behavioral specs

pub use mimic_mock::{Fault, Method, MockError, Spy, SpyCall, Stub};
pub use mimic_time::{
    delay, timers, AbortController, FakeDate, FakeTime, FakeTimeOptions, TimeError,
    TimerHandle,
};
pub use std::time::Duration;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A point whose `action` member can be spied on or stubbed.
///
/// `action` returns its first argument.
#[derive(Debug, Clone)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub action: Method<Point, Vec<i32>, Option<i32>>,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            action: Method::new("action", |_, args: Vec<i32>| Ok(args.first().copied())),
        }
    }

    pub fn action(&self, args: Vec<i32>) -> Result<Option<i32>, Fault> {
        self.action.invoke(self, args)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}
