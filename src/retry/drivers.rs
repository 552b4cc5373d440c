//! Fixed-budget retry drivers.
//!
//! # Responsibilities
//! - Re-invoke a fallible operation up to an attempt cap or wall-clock window
//! - Sleep a fixed delay after every failed attempt, including the last
//! - Surface the last operation error once the budget is exhausted

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};

/// Invoke `op` up to `max_attempts` times, sleeping `delay` after each failure.
///
/// The first success returns immediately with no trailing sleep. When every
/// attempt fails, the delay is still slept after the final attempt before the
/// last error is returned, so exhaustion takes `max_attempts * delay` of wall
/// clock. At least one attempt is always made.
pub async fn attempts<T, E, F, Fut>(max_attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        time::sleep(delay).await;

        attempt += 1;
        if attempt >= max_attempts {
            return Err(err);
        }
    }
}

/// Invoke `op` until it succeeds or `window` of wall-clock time has elapsed.
///
/// Sleeps `delay` after every failed attempt, the final one included. The
/// elapsed check runs before each new attempt starts, never preemptively
/// during a sleep. The window is measured from the first invocation; with
/// `window = k * delay` and an instant operation, `op` runs exactly `k`
/// times. At least one attempt is always made.
pub async fn timeout<T, E, F, Fut>(window: Duration, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        time::sleep(delay).await;

        if start.elapsed() >= window {
            return Err(err);
        }
    }
}
