//! Transport layer for MCP server.
//!
//! The server speaks MCP over stdio; stdout carries protocol messages only.

use rmcp::service::{serve_server, RoleServer, RunningService};
use rmcp::transport::io::stdio;

use super::tools::ThinkingServer;
use crate::error::{AppError, McpError};

/// Configuration for transport options.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum message size in bytes.
    pub max_message_size: usize,
    /// Read timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_message_size: 10 * 1024 * 1024, // 10MB
            read_timeout_ms: 300_000,           // 5 minutes
        }
    }
}

/// Stdio transport handler.
///
/// Newline-delimited JSON-RPC over stdin/stdout.
#[derive(Debug)]
pub struct StdioTransport {
    config: TransportConfig,
}

impl StdioTransport {
    /// Creates a new stdio transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TransportConfig::default(),
        }
    }

    /// Creates a new stdio transport with custom configuration.
    #[must_use]
    pub const fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Returns the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Runs the server using stdio transport.
    ///
    /// This function blocks until the client disconnects or an error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start or encounters
    /// a communication error.
    pub async fn serve(
        self,
        server: ThinkingServer,
    ) -> Result<RunningService<RoleServer, ThinkingServer>, AppError> {
        tracing::debug!(
            max_message_size = self.config.max_message_size,
            "Serving over stdio"
        );
        serve_server(server, stdio()).await.map_err(|e| {
            AppError::Mcp(McpError::Internal {
                message: format!("Failed to start stdio transport: {e}"),
            })
        })
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
