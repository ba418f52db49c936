// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real-time delays that can be aborted

use crate::error::TimeError;
use crate::fake_time::{self, FakeTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Aborts the delays listening to its signals
#[derive(Debug, Clone)]
pub struct AbortController {
    aborted: Arc<watch::Sender<bool>>,
}

impl AbortController {
    pub fn new() -> Self {
        let (aborted, _) = watch::channel(false);
        Self {
            aborted: Arc::new(aborted),
        }
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            aborted: self.aborted.subscribe(),
        }
    }

    pub fn abort(&self) {
        self.aborted.send_replace(true);
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes an [`AbortController`]
#[derive(Debug, Clone)]
pub struct AbortSignal {
    aborted: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn aborted(&self) -> bool {
        *self.aborted.borrow()
    }

    /// Resolves once aborted. Never resolves if the controller is dropped
    /// without aborting.
    async fn wait(&mut self) {
        if self.aborted.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Wait `duration` of real time, even while a fake clock is installed.
///
/// Fails with [`TimeError::Aborted`] if `signal` is aborted before or
/// during the wait.
pub async fn delay(duration: Duration, signal: Option<&AbortSignal>) -> Result<(), TimeError> {
    let faking = fake_time::installed().is_some();
    if faking {
        FakeTime::restore_for(sleep(duration, signal)).await?
    } else {
        sleep(duration, signal).await
    }
}

async fn sleep(duration: Duration, signal: Option<&AbortSignal>) -> Result<(), TimeError> {
    let Some(signal) = signal else {
        tokio::time::sleep(duration).await;
        return Ok(());
    };
    if signal.aborted() {
        return Err(TimeError::Aborted);
    }
    let mut signal = signal.clone();
    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        () = signal.wait() => Err(TimeError::Aborted),
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
