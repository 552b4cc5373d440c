//! Exponential backoff drivers.
//!
//! # Responsibilities
//! - Double the sleep interval after every failed attempt, clamped to a cap
//! - Bound the loop by an elapsed deadline or an external cancellation signal
//! - Keep the cancellation-aware sleep interruptible

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::retry::cancel::{CancelSignal, Cancelled};

/// Invoke `op` with exponentially growing sleeps until it succeeds or
/// `deadline` has elapsed.
///
/// The sleep starts at `min_sleep` and doubles after every failed attempt,
/// clamped to `max_sleep`. A `deadline` of [`Duration::ZERO`] disables the
/// bound and the loop runs until success; bounding is then the operation's
/// job.
///
/// The deadline is measured from the first invocation and checked after each
/// failure, so a slow operation can overshoot it by roughly one operation
/// duration plus one sleep interval.
pub async fn backoff<T, E, F, Fut>(
    deadline: Duration,
    min_sleep: Duration,
    max_sleep: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let mut sleep = min_sleep;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !deadline.is_zero() && start.elapsed() > deadline {
            return Err(err);
        }

        time::sleep(sleep).await;
        sleep = next_interval(sleep, max_sleep);
    }
}

/// Invoke `op` with the same backoff schedule as [`backoff`], stopping when
/// `signal` fires instead of at an internally measured deadline.
///
/// The signal is consulted before every attempt and raced against every
/// sleep, so a cancellation arriving mid-sleep returns promptly instead of
/// waiting the sleep out. A signal that has already fired means `op` is
/// never invoked. Operation errors never surface from this driver; they only
/// drive the next attempt.
pub async fn backoff_with_cancel<T, E, F, Fut>(
    mut signal: CancelSignal,
    min_sleep: Duration,
    max_sleep: Duration,
    mut op: F,
) -> Result<T, Cancelled>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut sleep = min_sleep;
    loop {
        if let Some(reason) = signal.reason() {
            return Err(Cancelled { reason });
        }

        if let Ok(value) = op().await {
            return Ok(value);
        }

        tokio::select! {
            reason = signal.fired() => return Err(Cancelled { reason }),
            _ = time::sleep(sleep) => {}
        }

        sleep = next_interval(sleep, max_sleep);
    }
}

fn next_interval(current: Duration, cap: Duration) -> Duration {
    current.saturating_mul(2).min(cap)
}
