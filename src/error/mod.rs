//! Error types for the MCP Thinking Server.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`AnthropicError`]: Anthropic API specific errors
//! - [`StorageError`]: Database operation errors
//! - [`McpError`]: MCP protocol errors
//! - [`ThinkingError`]: Thinking session engine errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by public API functions.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Anthropic API error.
    #[error("Anthropic API error: {0}")]
    Anthropic(#[from] AnthropicError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// MCP protocol error.
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Thinking engine error.
    #[error("Thinking error: {0}")]
    Thinking(#[from] ThinkingError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Anthropic API errors.
///
/// These errors represent failures when communicating with the Anthropic API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnthropicError {
    /// Authentication failed due to invalid API key.
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Request was rate limited.
    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// The requested model is overloaded.
    #[error("Model overloaded: {model}")]
    ModelOverloaded {
        /// The model that is overloaded.
        model: String,
    },

    /// Request timed out.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what's invalid.
        message: String,
    },

    /// Network communication error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// Unexpected response from the API.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl AnthropicError {
    /// Returns true if this error is retryable.
    ///
    /// Rate limiting and model overload errors are retryable.
    /// Authentication and invalid request errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ModelOverloaded { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}

/// Storage errors.
///
/// These errors represent failures in database operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// Session not found.
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// The session ID that was not found.
        session_id: String,
    },

    /// Thought node not found.
    #[error("Node not found: {node_id}")]
    NodeNotFound {
        /// The node ID that was not found.
        node_id: String,
    },

    /// A nested column could not be encoded or decoded.
    #[error("Serialization failed for {field}: {message}")]
    Serialization {
        /// The column being encoded or decoded.
        field: String,
        /// Description of the failure.
        message: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// MCP protocol errors.
///
/// These errors represent failures in MCP JSON-RPC communication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum McpError {
    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// Thinking session engine errors.
///
/// Not-found, state, and budget failures are raised before any inference
/// call is issued. Inference and parse failures carry the underlying message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThinkingError {
    /// The session does not exist.
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// The missing session ID.
        session_id: String,
    },

    /// The node does not exist in the session's tree.
    #[error("Node {node_id} not found in session {session_id}")]
    NodeNotFound {
        /// The session that was searched.
        session_id: String,
        /// The missing node ID.
        node_id: String,
    },

    /// The operation is not legal in the session's current status.
    #[error("Cannot {operation} session {session_id} in status {status}")]
    InvalidState {
        /// The session ID.
        session_id: String,
        /// The session's status at the time of the call.
        status: String,
        /// The rejected operation.
        operation: String,
    },

    /// The token ceiling was reached; the session has been paused.
    #[error("Token budget exceeded for session {session_id}: {tokens_used}/{max_tokens}")]
    BudgetExceeded {
        /// The session ID.
        session_id: String,
        /// Tokens consumed so far.
        tokens_used: u64,
        /// The configured ceiling.
        max_tokens: u64,
    },

    /// Structured model output did not have the expected shape.
    #[error("Failed to parse model output: {message}")]
    ParseError {
        /// Description of the parse failure.
        message: String,
    },

    /// The inference call itself failed.
    #[error("Inference failed: {message}")]
    InferenceFailure {
        /// The vendor error message.
        message: String,
    },

    /// A caller argument was rejected.
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput {
        /// The field name.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Persistence failed.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ThinkingError {
    /// Stable snake_case label for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionNotFound { .. } | Self::NodeNotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::BudgetExceeded { .. } => "budget_exceeded",
            Self::ParseError { .. } => "parse_error",
            Self::InferenceFailure { .. } => "inference_failure",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Storage(_) => "storage",
        }
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
