//! Main MCP server orchestration.
//!
//! Wires storage, the inference client and the engine together, then
//! serves tools over stdio until the client disconnects.

use std::sync::Arc;

use crate::anthropic::{AnthropicClient, ClientConfig};
use crate::config::Config;
use crate::error::AppError;
use crate::storage::SqliteStorage;

use super::tools::ThinkingServer;
use super::transport::StdioTransport;
use super::types::AppState;

/// Main MCP server that orchestrates all components.
#[derive(Debug)]
pub struct McpServer {
    config: Config,
}

impl McpServer {
    /// Creates a new MCP server with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the server using stdio transport.
    ///
    /// Blocks until the client disconnects or an error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Storage initialization fails
    /// - Anthropic client creation fails
    /// - The transport fails to start
    pub async fn run_stdio(&self) -> Result<(), AppError> {
        let storage = SqliteStorage::new(&self.config.database_path).await?;
        let client = AnthropicClient::new(
            self.config.api_key.clone(),
            ClientConfig::from(&self.config),
        )?;

        let state = AppState::new(storage, client, self.config.clone());
        let server = ThinkingServer::new(Arc::new(state));

        let running = StdioTransport::new().serve(server).await?;
        tracing::info!(database = %self.config.database_path, "Thinking server ready");

        if let Err(e) = running.waiting().await {
            tracing::warn!(error = %e, "Server task ended abnormally");
        }
        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
