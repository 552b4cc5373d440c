//! Retry driver subsystem.
//!
//! # Data Flow
//! ```text
//! Caller supplies: budget + operation
//!     → drivers.rs (attempt cap or wall-clock window, fixed delay)
//!     → backoff.rs (doubling sleep, bounded by deadline or cancel signal)
//!     → cancel.rs  (signal raced against the in-progress sleep)
//! ```
//!
//! # Design Decisions
//! - Every driver runs on the caller's task; no background work is spawned
//! - The sleep interval doubles deterministically up to the cap; no jitter
//! - Budget exhaustion returns the last operation error, not a synthetic one
//! - Only the cancellation-aware driver can interrupt a sleep in progress

pub mod backoff;
pub mod cancel;
pub mod drivers;

pub use backoff::{backoff, backoff_with_cancel};
pub use cancel::{Cancel, CancelReason, CancelSignal, Cancelled};
pub use drivers::{attempts, timeout};
