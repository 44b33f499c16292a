//! MCP server implementation.
//!
//! This module provides:
//! - Tool definitions with rmcp macros
//! - Request and response schemas for every tool
//! - Stdio transport
//! - Shared application state and the event log relay
//!
//! # Tools
//!
//! - **Lifecycle**: `thinking_start`, `thinking_pause`, `thinking_resume`,
//!   `thinking_synthesize`
//! - **Growth**: `thinking_expand`, `thinking_critique`, `thinking_alternatives`
//! - **Reads**: `thinking_tree`, `thinking_session`, `thinking_templates`
//! - **Annotation**: `thinking_bookmark`
//!
//! Engine errors come back as tool error results whose text is
//! `{"error": <kind>, "message": <text>}`.

mod mcp;
mod requests;
mod responses;
mod tools;
mod transport;
mod types;

pub use mcp::McpServer;
pub use requests::{
    AlternativesRequest, BookmarkRequest, CritiqueRequest, ExpandRequest, SessionRequest,
    StartRequest, TemplatesRequest, DEFAULT_PROJECT_ID,
};
pub use responses::{
    BookmarkResponse, ErrorResponse, NodeResponse, NodesResponse, SessionDetailResponse,
    SessionResponse, SynthesisResponse, TemplatesResponse, TreeResponse,
};
pub use tools::ThinkingServer;
pub use transport::{StdioTransport, TransportConfig};
pub use types::{AppState, Engine};
