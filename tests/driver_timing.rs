//! Timing conformance tests for the retry drivers.
//!
//! These run against the real clock, so every assertion allows generous
//! scheduling tolerance above the guaranteed lower bound.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use resilience::retry::{attempts, backoff, backoff_with_cancel, timeout};
use resilience::{Cancel, CancelReason};

#[tokio::test]
async fn attempts_sleeps_after_every_failure_including_the_last() {
    let calls = AtomicUsize::new(0);
    let start = Instant::now();

    let result: Result<(), &str> = attempts(5, Duration::from_millis(20), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("still failing") }
    })
    .await;

    let elapsed = start.elapsed();
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    // Five attempts pair with five sleeps, the final failure included.
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(400), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn attempts_success_pays_no_sleep() {
    let start = Instant::now();

    let result: Result<(), &str> = attempts(100, Duration::from_secs(60), || async { Ok(()) }).await;

    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn timeout_window_bounds_attempt_count_and_elapsed() {
    let calls = AtomicUsize::new(0);
    let start = Instant::now();

    let result: Result<(), &str> = timeout(Duration::from_millis(400), Duration::from_millis(100), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("still failing") }
    })
    .await;

    let elapsed = start.elapsed();
    assert!(result.is_err());
    // Four 100ms delays fill the 400ms window for an instant operation.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(elapsed >= Duration::from_millis(400), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(700), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn timeout_success_pays_no_sleep() {
    let start = Instant::now();

    let result: Result<(), &str> =
        timeout(Duration::from_secs(3600), Duration::from_secs(60), || async { Ok(()) }).await;

    assert!(result.is_ok());
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn unbounded_backoff_runs_until_success() {
    let start = Instant::now();

    let result: Result<(), &str> = backoff(
        Duration::ZERO,
        Duration::from_millis(50),
        Duration::from_secs(1),
        || {
            let elapsed = start.elapsed();
            async move {
                if elapsed > Duration::from_millis(200) {
                    Ok(())
                } else {
                    Err("not yet")
                }
            }
        },
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn finite_deadline_is_not_exceeded_dramatically() {
    let deadline = Duration::from_millis(300);
    let op_duration = Duration::from_millis(25);
    let max_sleep = Duration::from_millis(25);
    let start = Instant::now();

    let result: Result<(), &str> = backoff(deadline, Duration::from_millis(5), max_sleep, || async {
        tokio::time::sleep(Duration::from_millis(25)).await;
        Err("still failing")
    })
    .await;

    let elapsed = start.elapsed();
    assert!(result.is_err());
    assert!(elapsed >= deadline, "elapsed {elapsed:?}");
    // Overshoot is bounded by one operation duration plus one sleep interval,
    // plus scheduling slack.
    let bound = deadline + op_duration + max_sleep + Duration::from_millis(150);
    assert!(elapsed < bound, "elapsed {elapsed:?} exceeds {bound:?}");
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_sleep() {
    let cancel = Arc::new(Cancel::new());
    let signal = cancel.signal();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    // Sleeps far longer than the cancellation arrival; the driver must not
    // wait the sleep out.
    let result: Result<(), _> = backoff_with_cancel(
        signal,
        Duration::from_secs(10),
        Duration::from_secs(10),
        || async { Err("still failing") },
    )
    .await;

    let elapsed = start.elapsed();
    let err = result.unwrap_err();
    assert_eq!(err.reason, CancelReason::Cancelled);
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn attached_deadline_interrupts_a_pending_sleep() {
    let cancel = Cancel::with_timeout(Duration::from_millis(100));

    let start = Instant::now();
    let result: Result<(), _> = backoff_with_cancel(
        cancel.signal(),
        Duration::from_secs(10),
        Duration::from_secs(10),
        || async { Err("still failing") },
    )
    .await;

    let elapsed = start.elapsed();
    let err = result.unwrap_err();
    assert_eq!(err.reason, CancelReason::DeadlineExceeded);
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
}
