//! MCP Thinking Server binary entry point.
//!
//! All logs go to stderr; stdout is reserved for MCP JSON-RPC messages.

use mcp_thinking::config::Config;
use mcp_thinking::server::McpServer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        database = %config.database_path,
        model = %config.model,
        timeout_ms = config.request_timeout_ms,
        "mcp-thinking starting"
    );

    let server = McpServer::new(config);
    tokio::select! {
        result = server.run_stdio() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received");
        }
    }

    tracing::info!("mcp-thinking shutdown complete");
}
