//! Cancellation signalling for retry drivers.
//!
//! # Responsibilities
//! - Fan a cancellation reason out to any number of subscribed signals
//! - Attach an optional deadline that fires signals without an explicit cancel
//! - Answer non-blocking "has this fired?" queries

use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Why a cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The [`Cancel`] handle was cancelled explicitly.
    Cancelled,
    /// The deadline attached to the handle passed.
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "cancelled"),
            CancelReason::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

/// Error returned by a driver stopped by its cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("retry cancelled: {reason}")]
pub struct Cancelled {
    /// The reason the signal fired.
    pub reason: CancelReason,
}

/// Handle that fires cancellation to every subscribed [`CancelSignal`].
///
/// The fired reason is terminal: the first one wins and later cancels are
/// ignored. Dropping the handle without cancelling does not fire its
/// subscribers; an attached deadline still does.
pub struct Cancel {
    tx: watch::Sender<Option<CancelReason>>,
    deadline: Option<Instant>,
}

impl Cancel {
    /// Create a handle with no deadline.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx, deadline: None }
    }

    /// Create a handle whose signals fire [`CancelReason::DeadlineExceeded`]
    /// once `timeout` has elapsed, unless explicitly cancelled first.
    pub fn with_timeout(timeout: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Fire [`CancelReason::Cancelled`]. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_if_modified(|state| {
            if state.is_none() {
                *state = Some(CancelReason::Cancelled);
                true
            } else {
                false
            }
        });
    }

    /// Subscribe a signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
            deadline: self.deadline,
        }
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription to a [`Cancel`] handle.
///
/// Cheap to clone; every clone observes the same handle and deadline.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<Option<CancelReason>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// Resolve once the signal fires, yielding the reason.
    ///
    /// Waits on the handle and the attached deadline at once. A signal whose
    /// handle was dropped without cancelling and which has no deadline pends
    /// forever.
    pub async fn fired(&mut self) -> CancelReason {
        loop {
            if let Some(reason) = self.reason() {
                return reason;
            }
            tokio::select! {
                _ = deadline_sleep(self.deadline) => return CancelReason::DeadlineExceeded,
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        // Handle dropped without cancelling; only a deadline
                        // can fire this signal now.
                        deadline_sleep(self.deadline).await;
                        return CancelReason::DeadlineExceeded;
                    }
                }
            }
        }
    }

    /// Non-blocking query: the reason, once fired.
    pub fn reason(&self) -> Option<CancelReason> {
        if let Some(reason) = *self.rx.borrow() {
            return Some(reason);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        self.reason().is_some()
    }
}

async fn deadline_sleep(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
