//! Wait gate - bounded polling for asynchronous effects
//!
//! Actions against a remote UI often return before their effect is visible
//! (an application hiding, a window appearing). This crate re-evaluates a
//! fresh predicate at a fixed spacing until it yields a result or the deadline
//! passes. Nothing is retried except the predicate itself.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timing for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_millis(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(poll_interval_ms),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Raised by `wait_until` when the predicate never yielded
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Condition not met after {}ms ({polls} polls)", .waited.as_millis())]
pub struct Timeout {
    pub waited: Duration,
    pub polls: u32,
}

/// Poll `predicate` until it yields `Some`, or return `Ok(None)` at the deadline.
///
/// The predicate is always evaluated at least once. A poll is only started
/// while it can begin before the deadline, so a 300ms timeout at a 100ms
/// interval evaluates the predicate three times. Errors from the predicate
/// stop the wait and are returned unchanged.
pub async fn wait_for<T, E, F, Fut>(options: WaitOptions, mut predicate: F) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let interval = options.poll_interval.max(MIN_POLL_INTERVAL);
    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        if let Some(found) = predicate().await? {
            debug!(polls, elapsed_ms = started.elapsed().as_millis() as u64, "wait satisfied");
            return Ok(Some(found));
        }

        if Instant::now() + interval > deadline {
            debug!(
                polls,
                timeout_ms = options.timeout.as_millis() as u64,
                "wait timed out"
            );
            return Ok(None);
        }

        sleep(interval).await;
    }
}

/// Like `wait_for`, but a timeout becomes an error.
pub async fn wait_until<T, E, F, Fut>(options: WaitOptions, predicate: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: From<Timeout>,
{
    let started = Instant::now();
    let mut polls = 0u32;
    let mut predicate = predicate;
    let counted = || {
        polls += 1;
        predicate()
    };
    let outcome = wait_for(options, counted).await?;
    match outcome {
        Some(found) => Ok(found),
        None => Err(Timeout {
            waited: started.elapsed(),
            polls,
        }
        .into()),
    }
}

/// Poll a boolean probe until it reports `expected`; returns the last reading.
pub async fn wait_for_state<E, F, Fut>(
    options: WaitOptions,
    expected: bool,
    mut probe: F,
) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let reached = wait_for(options, || {
        let reading = probe();
        async move { Ok::<_, E>((reading.await? == expected).then_some(())) }
    })
    .await?;
    Ok(if reached.is_some() { expected } else { !expected })
}
