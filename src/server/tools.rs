//! Tool definitions with rmcp macros.
//!
//! This module exposes the session engine as MCP tools. The router is
//! built with `#[tool_router]` on the impl and `#[tool]` on each method;
//! `#[tool_handler]` wires it into [`ServerHandler`].

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler};

use super::requests::{
    AlternativesRequest, BookmarkRequest, CritiqueRequest, ExpandRequest, SessionRequest,
    StartRequest, TemplatesRequest, DEFAULT_PROJECT_ID,
};
use super::responses::{
    failure, respond, BookmarkResponse, NodeResponse, NodesResponse, SessionDetailResponse,
    SessionResponse, SynthesisResponse, TemplatesResponse, TreeResponse,
};
use super::types::AppState;
use crate::error::ThinkingError;
use crate::thinking::StartSession;

/// Alternatives requested when the caller gives no count.
const DEFAULT_ALTERNATIVES: u32 = 2;

/// MCP server exposing thinking-session tools.
#[derive(Clone)]
pub struct ThinkingServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for ThinkingServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThinkingServer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl ThinkingServer {
    /// Create a server over `state`.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Shared state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[tool(
        description = "Start a thinking session on a query. Creates the root thought; with auto_expand the tree grows on its own until done."
    )]
    async fn thinking_start(
        &self,
        Parameters(req): Parameters<StartRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let config = match req.thinking_config(self.state.config.default_thinking_config()) {
            Ok(config) => config,
            Err(e) => return Ok(failure(&e)),
        };
        let mut request = StartSession::new(
            req.query,
            req.project_id.unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string()),
        )
        .with_config(config);
        request.user_id = req.user_id;

        let outcome = self
            .state
            .engine
            .start_session_with_stream(request)
            .await
            .map(|(session, stream)| {
                super::types::log_events(stream);
                SessionResponse { session }
            });
        Ok(respond(outcome))
    }

    #[tool(
        description = "Expand a thought into 1..max_branches children. Defaults to the session's current thought."
    )]
    async fn thinking_expand(
        &self,
        Parameters(req): Parameters<ExpandRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.state.ensure_event_log(&req.session_id).await;
        Ok(respond(self.expand(req).await))
    }

    #[tool(
        description = "Critique a thought: strengths, weaknesses, faulty assumptions. Adds one critique child."
    )]
    async fn thinking_critique(
        &self,
        Parameters(req): Parameters<CritiqueRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.state.ensure_event_log(&req.session_id).await;
        Ok(respond(self.critique(req).await))
    }

    #[tool(
        description = "Generate alternative readings of a thought as its siblings. All or none are created."
    )]
    async fn thinking_alternatives(
        &self,
        Parameters(req): Parameters<AlternativesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.state.ensure_event_log(&req.session_id).await;
        let outcome = self
            .state
            .engine
            .explore_alternatives(
                &req.session_id,
                &req.node_id,
                req.count.unwrap_or(DEFAULT_ALTERNATIVES),
            )
            .await
            .map(|nodes| NodesResponse {
                session_id: req.session_id.clone(),
                nodes,
            });
        Ok(respond(outcome))
    }

    #[tool(description = "Pause a thinking session.")]
    async fn thinking_pause(
        &self,
        Parameters(req): Parameters<SessionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .state
            .engine
            .pause(&req.session_id)
            .await
            .map(|session| SessionResponse { session });
        Ok(respond(outcome))
    }

    #[tool(description = "Resume a paused session; auto-expansion picks up where it stopped.")]
    async fn thinking_resume(
        &self,
        Parameters(req): Parameters<SessionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.state.ensure_event_log(&req.session_id).await;
        let outcome = self
            .state
            .engine
            .resume(&req.session_id)
            .await
            .map(|session| SessionResponse { session });
        Ok(respond(outcome))
    }

    #[tool(description = "Bookmark a thought with an optional note.")]
    async fn thinking_bookmark(
        &self,
        Parameters(req): Parameters<BookmarkRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .state
            .engine
            .bookmark(&req.session_id, &req.node_id, req.user_id, req.note)
            .await
            .map(|bookmark| BookmarkResponse { bookmark });
        Ok(respond(outcome))
    }

    #[tool(
        description = "Synthesize a final conclusion from the whole tree and complete the session."
    )]
    async fn thinking_synthesize(
        &self,
        Parameters(req): Parameters<SessionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = self
            .state
            .engine
            .synthesize(&req.session_id)
            .await
            .map(|conclusion| SynthesisResponse {
                session_id: req.session_id.clone(),
                conclusion,
            });
        Ok(respond(outcome))
    }

    #[tool(description = "Return every thought of a session in creation order.")]
    async fn thinking_tree(
        &self,
        Parameters(req): Parameters<SessionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(respond(self.tree(&req.session_id).await))
    }

    #[tool(description = "Return a session's status, statistics, conclusion and bookmarks.")]
    async fn thinking_session(
        &self,
        Parameters(req): Parameters<SessionRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(respond(self.session_detail(&req.session_id).await))
    }

    #[tool(description = "List reasoning templates, or fetch one by name.")]
    async fn thinking_templates(
        &self,
        Parameters(req): Parameters<TemplatesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let engine = &self.state.engine;
        let outcome = match req.name.as_deref() {
            None => Ok(engine.list_templates().to_vec()),
            Some(name) => engine
                .get_template(name)
                .map(|template| vec![template.clone()])
                .ok_or_else(|| ThinkingError::InvalidInput {
                    field: "name".to_string(),
                    reason: format!("unknown template '{name}'"),
                }),
        }
        .map(|templates| TemplatesResponse { templates });
        Ok(respond(outcome))
    }
}

impl ThinkingServer {
    async fn expand(&self, req: ExpandRequest) -> Result<NodesResponse, ThinkingError> {
        let node_id = self.node_or_current(&req.session_id, req.node_id).await?;
        let nodes = self
            .state
            .engine
            .expand(&req.session_id, &node_id, req.count.unwrap_or(1))
            .await?;
        Ok(NodesResponse {
            session_id: req.session_id,
            nodes,
        })
    }

    async fn critique(&self, req: CritiqueRequest) -> Result<NodeResponse, ThinkingError> {
        let node_id = self.node_or_current(&req.session_id, req.node_id).await?;
        let node = self.state.engine.critique(&req.session_id, &node_id).await?;
        Ok(NodeResponse {
            session_id: req.session_id,
            node,
        })
    }

    async fn tree(&self, session_id: &str) -> Result<TreeResponse, ThinkingError> {
        let session = self.state.engine.get_session(session_id).await?;
        let nodes = self.state.engine.get_tree(session_id).await?;
        Ok(TreeResponse {
            session_id: session.id,
            root_node_id: session.root_node_id,
            nodes,
        })
    }

    async fn session_detail(
        &self,
        session_id: &str,
    ) -> Result<SessionDetailResponse, ThinkingError> {
        let session = self.state.engine.get_session(session_id).await?;
        let bookmarks = self.state.engine.list_bookmarks(session_id).await?;
        Ok(SessionDetailResponse { session, bookmarks })
    }

    /// The node the caller named, else the session's current node.
    async fn node_or_current(
        &self,
        session_id: &str,
        node_id: Option<String>,
    ) -> Result<String, ThinkingError> {
        match node_id {
            Some(node_id) => Ok(node_id),
            None => Ok(self.state.engine.get_session(session_id).await?.current_node_id),
        }
    }
}

#[tool_handler]
impl ServerHandler for ThinkingServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation::from_build_env();
        info.instructions = Some(
            "Thinking sessions: start with thinking_start, grow the tree with \
             thinking_expand/critique/alternatives, finish with thinking_synthesize."
                .to_string(),
        );
        info
    }
}
