//! Policy loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ResiliencePolicy;

/// Error type for policy loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the policy file failed.
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was not valid TOML for the policy schema.
    #[error("failed to parse policy file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The parsed policy failed semantic validation.
    #[error("invalid policy: {}", join_violations(.0))]
    Validation(Vec<Violation>),
}

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// The fixed-attempt driver needs at least one attempt.
    #[error("attempts.max_attempts must be at least 1")]
    ZeroAttempts,

    /// A zero retry window would not admit a single attempt's delay.
    #[error("timeout.window_ms must be nonzero")]
    ZeroWindow,

    /// A zero initial sleep can never double into a real backoff.
    #[error("backoff.min_sleep_ms must be nonzero")]
    ZeroMinSleep,

    /// The sleep cap must admit the initial sleep.
    #[error("backoff.max_sleep_ms ({max}) is below min_sleep_ms ({min})")]
    SleepBoundsInverted { min: u64, max: u64 },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Semantic validation, run after serde has handled the syntactic layer.
///
/// Returns all violations, not just the first.
pub fn validate_policy(policy: &ResiliencePolicy) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if policy.attempts.max_attempts == 0 {
        violations.push(Violation::ZeroAttempts);
    }
    if policy.timeout.window_ms == 0 {
        violations.push(Violation::ZeroWindow);
    }
    if policy.backoff.min_sleep_ms == 0 {
        violations.push(Violation::ZeroMinSleep);
    }
    if policy.backoff.max_sleep_ms < policy.backoff.min_sleep_ms {
        violations.push(Violation::SleepBoundsInverted {
            min: policy.backoff.min_sleep_ms,
            max: policy.backoff.max_sleep_ms,
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Parse and validate a policy from TOML text.
pub fn policy_from_str(content: &str) -> Result<ResiliencePolicy, ConfigError> {
    let policy: ResiliencePolicy = toml::from_str(content)?;
    validate_policy(&policy).map_err(ConfigError::Validation)?;
    Ok(policy)
}

/// Load and validate a policy from a TOML file.
pub fn load_policy(path: &Path) -> Result<ResiliencePolicy, ConfigError> {
    let content = fs::read_to_string(path)?;
    policy_from_str(&content)
}
