//! Configuration validation.
//!
//! Range checks for the values loaded by [`Config::from_env`](super::Config::from_env).

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed timeout in milliseconds (1 second).
pub const MIN_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Upper bound for the per-call branching factor.
pub const MAX_BRANCHES_LIMIT: u32 = 10;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `ANTHROPIC_API_KEY` must not be empty
/// - `REQUEST_TIMEOUT_MS` must be between 1000 and 300000
/// - `MAX_RETRIES` must be between 0 and 10
/// - `THINKING_MAX_TOKENS` and `THINKING_MAX_DEPTH` must be positive
/// - `THINKING_MAX_BRANCHES` must be between 1 and 10
/// - `THINKING_MIN_CONFIDENCE` must be at most 100
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api_key.is_empty() {
        return Err(invalid("ANTHROPIC_API_KEY", "must not be empty"));
    }

    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&config.request_timeout_ms) {
        return Err(invalid(
            "REQUEST_TIMEOUT_MS",
            format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        ));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(invalid(
            "MAX_RETRIES",
            format!("must be between 0 and {MAX_RETRIES}"),
        ));
    }

    if config.thinking_max_tokens == 0 {
        return Err(invalid("THINKING_MAX_TOKENS", "must be positive"));
    }

    if config.thinking_max_depth == 0 {
        return Err(invalid("THINKING_MAX_DEPTH", "must be positive"));
    }

    if !(1..=MAX_BRANCHES_LIMIT).contains(&config.thinking_max_branches) {
        return Err(invalid(
            "THINKING_MAX_BRANCHES",
            format!("must be between 1 and {MAX_BRANCHES_LIMIT}"),
        ));
    }

    if config.thinking_min_confidence > 100 {
        return Err(invalid("THINKING_MIN_CONFIDENCE", "must be at most 100"));
    }

    Ok(())
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.into(),
        reason: reason.into(),
    }
}
