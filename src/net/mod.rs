//! Listener decoration subsystem.
//!
//! # Data Flow
//! ```text
//! accept() on RetryListener
//!     → underlying listener accept
//!     → Ok: hand the connection to the caller unchanged
//!     → Err, not transient: surface unchanged
//!     → Err, transient: notify observer, accept again immediately
//! ```
//!
//! # Design Decisions
//! - Transience is a capability the error type opts into, not an error enum
//! - Transient retries are immediate and uncapped; the condition is expected to clear quickly
//! - The observer is a side-channel only; it cannot change control flow

pub mod listener;

pub use listener::{Listener, RetryListener, Transient};
