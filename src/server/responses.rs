//! Response types for thinking tools.
//!
//! Every tool answers with one JSON text block. Engine failures become
//! error results carrying [`ErrorResponse`].

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::error::ThinkingError;
use crate::templates::ReasoningTemplate;
use crate::thinking::{Bookmark, ThinkingSession, ThoughtNode};

/// Response carrying a session record.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// The session after the operation.
    pub session: ThinkingSession,
}

/// Response carrying nodes created by one operation.
#[derive(Debug, Clone, Serialize)]
pub struct NodesResponse {
    /// Session ID.
    pub session_id: String,
    /// New nodes in creation order.
    pub nodes: Vec<ThoughtNode>,
}

/// Response carrying one created node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeResponse {
    /// Session ID.
    pub session_id: String,
    /// The new node.
    pub node: ThoughtNode,
}

/// Response from synthesis.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResponse {
    /// Session ID.
    pub session_id: String,
    /// Final conclusion.
    pub conclusion: String,
}

/// Response carrying a whole tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeResponse {
    /// Session ID.
    pub session_id: String,
    /// Root node ID.
    pub root_node_id: String,
    /// Every node in creation order.
    pub nodes: Vec<ThoughtNode>,
}

/// Response from session lookup.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetailResponse {
    /// The session.
    pub session: ThinkingSession,
    /// Its bookmarks in creation order.
    pub bookmarks: Vec<Bookmark>,
}

/// Response from bookmarking.
#[derive(Debug, Clone, Serialize)]
pub struct BookmarkResponse {
    /// The new bookmark.
    pub bookmark: Bookmark,
}

/// Response listing templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplatesResponse {
    /// Templates in catalog order.
    pub templates: Vec<ReasoningTemplate>,
}

/// Body of an error result.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error kind label.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&ThinkingError> for ErrorResponse {
    fn from(error: &ThinkingError) -> Self {
        Self {
            error: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Successful tool result holding `value` as JSON.
pub fn success<T: Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string(value) {
        Ok(json) => CallToolResult::success(vec![Content::text(json)]),
        Err(e) => error_body(&ErrorResponse {
            error: "internal".to_string(),
            message: format!("Failed to serialize response: {e}"),
        }),
    }
}

/// Error tool result for an engine failure.
pub fn failure(error: &ThinkingError) -> CallToolResult {
    error_body(&ErrorResponse::from(error))
}

fn error_body(body: &ErrorResponse) -> CallToolResult {
    let json = serde_json::to_string(body).unwrap_or_else(|_| {
        format!(r#"{{"error":"{}","message":"unserializable"}}"#, body.error)
    });
    CallToolResult::error(vec![Content::text(json)])
}

/// Tool result for an engine outcome.
pub fn respond<T: Serialize>(outcome: Result<T, ThinkingError>) -> CallToolResult {
    match outcome {
        Ok(value) => success(&value),
        Err(e) => failure(&e),
    }
}
