//! Retry policy schema definitions.
//!
//! This module defines the deserializable policy structure for the retry
//! drivers. All types derive Serde traits for deserialization from config
//! files; durations are carried as millisecond integers with accessor
//! methods converting to [`Duration`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root policy for the retry drivers.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResiliencePolicy {
    /// Fixed-attempt driver parameters.
    pub attempts: AttemptsPolicy,

    /// Wall-clock-window driver parameters.
    pub timeout: TimeoutPolicy,

    /// Exponential backoff driver parameters.
    pub backoff: BackoffPolicy,
}

/// Parameters for the fixed-attempt driver.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttemptsPolicy {
    /// Maximum number of attempts (at least 1).
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl AttemptsPolicy {
    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AttemptsPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 100,
        }
    }
}

/// Parameters for the wall-clock-window driver.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutPolicy {
    /// Total retry window in milliseconds.
    pub window_ms: u64,

    /// Delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl TimeoutPolicy {
    /// Total retry window.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Delay between attempts.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            window_ms: 30_000,
            delay_ms: 500,
        }
    }
}

/// Parameters for the exponential backoff drivers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffPolicy {
    /// Retry deadline in milliseconds. Zero means no deadline: retry until
    /// success.
    pub deadline_ms: u64,

    /// Initial sleep between attempts in milliseconds.
    pub min_sleep_ms: u64,

    /// Cap on the doubling sleep in milliseconds.
    pub max_sleep_ms: u64,
}

impl BackoffPolicy {
    /// Retry deadline; [`Duration::ZERO`] means unbounded.
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    /// Initial sleep between attempts.
    pub fn min_sleep(&self) -> Duration {
        Duration::from_millis(self.min_sleep_ms)
    }

    /// Cap on the doubling sleep.
    pub fn max_sleep(&self) -> Duration {
        Duration::from_millis(self.max_sleep_ms)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            deadline_ms: 0,
            min_sleep_ms: 100,
            max_sleep_ms: 2_000,
        }
    }
}
