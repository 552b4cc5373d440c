//! Retry policy configuration subsystem.
//!
//! # Data Flow
//! ```text
//! policy file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs validate_policy (semantic checks)
//!     → ResiliencePolicy (validated, immutable)
//!     → Duration accessors feed the retry drivers
//! ```
//!
//! # Design Decisions
//! - A policy is immutable once loaded; changes require a full reload
//! - All fields have defaults so a minimal or empty file is a valid policy
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;

pub use loader::{load_policy, policy_from_str, ConfigError, Violation};
pub use schema::{AttemptsPolicy, BackoffPolicy, ResiliencePolicy, TimeoutPolicy};
