//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//! - Secure API key storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use mcp_thinking::config::{Config, SecretString};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config::new(SecretString::new("sk-ant-example-key"));
//!
//! println!("Using model: {}", config.model);
//! // API key is protected from accidental logging
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("sk-ant-example-key"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_config, MAX_BRANCHES_LIMIT, MAX_RETRIES, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};

use crate::error::ConfigError;
use crate::thinking::{ThinkingConfig, ThinkingStyle};

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/thinking.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default maximum retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default Anthropic model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default per-session token ceiling.
pub const DEFAULT_THINKING_MAX_TOKENS: u64 = 50_000;

/// Default maximum tree depth.
pub const DEFAULT_THINKING_MAX_DEPTH: u32 = 10;

/// Default branching factor per expansion call.
pub const DEFAULT_THINKING_MAX_BRANCHES: u32 = 3;

/// Default auto-expansion confidence threshold.
pub const DEFAULT_THINKING_MIN_CONFIDENCE: u8 = 60;

/// Application configuration.
///
/// This struct holds all configuration values for the MCP Thinking Server.
/// Use [`Config::from_env`] to load configuration from environment variables.
///
/// The `api_key` field uses [`SecretString`] to prevent accidental logging.
/// The `thinking_*` fields are the session defaults applied when a caller
/// omits them from a `thinking_start` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Anthropic API key (protected from logging via [`SecretString`]).
    pub api_key: SecretString,
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum retry attempts.
    pub max_retries: u32,
    /// Anthropic model to use.
    pub model: String,
    /// Default token ceiling per session.
    pub thinking_max_tokens: u64,
    /// Default maximum tree depth.
    pub thinking_max_depth: u32,
    /// Default branching factor per expansion call.
    pub thinking_max_branches: u32,
    /// Default auto-expansion confidence threshold (0-100).
    pub thinking_min_confidence: u8,
}

impl Config {
    /// Build a configuration with every optional value at its default.
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            model: DEFAULT_MODEL.to_string(),
            thinking_max_tokens: DEFAULT_THINKING_MAX_TOKENS,
            thinking_max_depth: DEFAULT_THINKING_MAX_DEPTH,
            thinking_max_branches: DEFAULT_THINKING_MAX_BRANCHES,
            thinking_min_confidence: DEFAULT_THINKING_MIN_CONFIDENCE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ANTHROPIC_API_KEY`: Anthropic API key
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to `SQLite` database (default: `./data/thinking.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `REQUEST_TIMEOUT_MS`: Request timeout (default: `30000`)
    /// - `MAX_RETRIES`: Maximum retry attempts (default: `3`)
    /// - `ANTHROPIC_MODEL`: Model to use (default: `claude-sonnet-4-20250514`)
    /// - `THINKING_MAX_TOKENS`: Session token ceiling (default: `50000`)
    /// - `THINKING_MAX_DEPTH`: Maximum tree depth (default: `10`)
    /// - `THINKING_MAX_BRANCHES`: Children per expansion call (default: `3`)
    /// - `THINKING_MIN_CONFIDENCE`: Auto-expansion threshold (default: `60`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `ANTHROPIC_API_KEY` is missing
    /// - a numeric variable is not a valid positive integer
    /// - Any value fails validation (see [`validate_config`])
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingRequired {
                var: "ANTHROPIC_API_KEY".into(),
            })?;

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let config = Self {
            api_key: SecretString::new(api_key),
            database_path,
            log_level,
            request_timeout_ms: parse_env_u64("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
            max_retries: parse_env_u32("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            model,
            thinking_max_tokens: parse_env_u64(
                "THINKING_MAX_TOKENS",
                DEFAULT_THINKING_MAX_TOKENS,
            )?,
            thinking_max_depth: parse_env_u32("THINKING_MAX_DEPTH", DEFAULT_THINKING_MAX_DEPTH)?,
            thinking_max_branches: parse_env_u32(
                "THINKING_MAX_BRANCHES",
                DEFAULT_THINKING_MAX_BRANCHES,
            )?,
            thinking_min_confidence: parse_env_u8(
                "THINKING_MIN_CONFIDENCE",
                DEFAULT_THINKING_MIN_CONFIDENCE,
            )?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Session configuration used when a caller omits fields.
    ///
    /// Feature flags default to on, auto-expansion to off, no template and
    /// the balanced style.
    #[must_use]
    pub fn default_thinking_config(&self) -> ThinkingConfig {
        ThinkingConfig {
            max_tokens: self.thinking_max_tokens,
            max_depth: self.thinking_max_depth,
            max_branches: self.thinking_max_branches,
            min_confidence_threshold: self.thinking_min_confidence,
            enable_self_critique: true,
            enable_parallel_exploration: true,
            auto_expand: false,
            template: None,
            model: self.model.clone(),
            style: ThinkingStyle::Balanced,
        }
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as a 0-255 integer, using a default if not set.
fn parse_env_u8(name: &str, default: u8) -> Result<u8, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be an integer between 0 and 100".into(),
        })
    })
}
