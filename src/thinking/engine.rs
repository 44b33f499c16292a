//! Thinking session engine.
//!
//! [`ThinkingEngine`] owns every session mutation. Each operation takes the
//! session's lock, loads the authoritative state from storage, mutates it,
//! commits the change atomically, and only then publishes events.
//!
//! The operations themselves live in sibling modules:
//! - `expansion`: `expand`
//! - `review`: `critique`, `explore_alternatives`
//! - `synthesis`: `synthesize`
//! - `lifecycle`: `pause`, `resume`, the auto-expansion loop

#![allow(clippy::missing_errors_doc)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::events::{EventBus, EventStream, ThinkingEvent};
use super::locks::{LoopGenerations, SessionLocks};
use super::types::{
    Bookmark, NodeMetadata, NodeStatus, SessionStatus, ThinkingConfig, ThinkingSession,
    ThoughtNode, TreeCommit,
};
use crate::error::ThinkingError;
use crate::heuristics::TypePerturbation;
use crate::prompts::SYSTEM_PROMPT;
use crate::templates::{ReasoningTemplate, TemplateCatalog};
use crate::traits::{
    CompletionConfig, InferenceClientTrait, Message, RealTimeProvider, StorageTrait, TimeProvider,
};

/// Ceiling on the tokens requested by one expansion-style call.
pub const PER_CALL_MAX_TOKENS: u32 = 2048;
/// Tokens requested by a synthesis call.
pub const SYNTHESIS_MAX_TOKENS: u32 = 4096;
/// `session_paused` reason for budget exhaustion.
pub const BUDGET_PAUSE_REASON: &str = "token budget exhausted";
/// `session_paused` reason for an explicit pause.
pub const REQUESTED_PAUSE_REASON: &str = "requested";

/// Arguments of `StartSession`.
#[derive(Debug, Clone, PartialEq)]
pub struct StartSession {
    /// Question to reason about.
    pub query: String,
    /// Owning project.
    pub project_id: String,
    /// Owning user.
    pub user_id: Option<String>,
    /// Session configuration, fixed for the session's lifetime.
    pub config: ThinkingConfig,
}

impl StartSession {
    /// Request with the default configuration.
    #[must_use]
    pub fn new(query: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            project_id: project_id.into(),
            user_id: None,
            config: ThinkingConfig::default(),
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ThinkingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the owning user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Text and cost of one inference call.
#[derive(Debug, Clone)]
pub(super) struct Generation {
    pub(super) text: String,
    pub(super) tokens: u64,
    pub(super) duration_ms: u64,
}

/// The session engine.
///
/// Cheap to clone; clones share storage, client, locks, and the event bus.
pub struct ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    pub(super) storage: Arc<S>,
    pub(super) client: Arc<C>,
    pub(super) catalog: Arc<TemplateCatalog>,
    pub(super) bus: Arc<EventBus>,
    pub(super) locks: Arc<SessionLocks>,
    pub(super) loops: Arc<LoopGenerations>,
    pub(super) perturbation: TypePerturbation,
    pub(super) clock: Arc<dyn TimeProvider>,
}

impl<S, C> Clone for ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            client: Arc::clone(&self.client),
            catalog: Arc::clone(&self.catalog),
            bus: Arc::clone(&self.bus),
            locks: Arc::clone(&self.locks),
            loops: Arc::clone(&self.loops),
            perturbation: self.perturbation,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> std::fmt::Debug for ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThinkingEngine")
            .field("templates", &self.catalog.list().len())
            .field("locked_sessions", &self.locks.len())
            .field("perturbation", &self.perturbation)
            .finish_non_exhaustive()
    }
}

impl<S, C> ThinkingEngine<S, C>
where
    S: StorageTrait + 'static,
    C: InferenceClientTrait + 'static,
{
    /// Create an engine with the built-in templates and the system clock.
    #[must_use]
    pub fn new(storage: Arc<S>, client: Arc<C>) -> Self {
        Self {
            storage,
            client,
            catalog: Arc::new(TemplateCatalog::builtin()),
            bus: Arc::new(EventBus::new()),
            locks: Arc::new(SessionLocks::new()),
            loops: Arc::new(LoopGenerations::new()),
            perturbation: TypePerturbation::default(),
            clock: Arc::new(RealTimeProvider),
        }
    }

    /// Replace the template catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the type-progression perturbation.
    #[must_use]
    pub const fn with_perturbation(mut self, perturbation: TypePerturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// The event bus shared by all clones of this engine.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    // ------------------------------------------------------------------
    // Session creation and read-only operations
    // ------------------------------------------------------------------

    /// Create a session in `thinking` status with its root node.
    ///
    /// Schedules the first auto-expansion pass when `auto_expand` is set.
    pub async fn start_session(
        &self,
        request: StartSession,
    ) -> Result<ThinkingSession, ThinkingError> {
        let session = self.create_session(request).await?;
        if session.config.auto_expand {
            self.schedule_auto_expand(&session.id, true);
        }
        Ok(session)
    }

    /// Like [`start_session`](Self::start_session), subscribing to the
    /// session's events before any auto-expansion can publish.
    pub async fn start_session_with_stream(
        &self,
        request: StartSession,
    ) -> Result<(ThinkingSession, EventStream), ThinkingError> {
        let session = self.create_session(request).await?;
        let stream = self.bus.subscribe(&session.id);
        if session.config.auto_expand {
            self.schedule_auto_expand(&session.id, true);
        }
        Ok((session, stream))
    }

    async fn create_session(&self, request: StartSession) -> Result<ThinkingSession, ThinkingError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(ThinkingError::InvalidInput {
                field: "query".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        request.config.validate()?;
        if let Some(name) = request.config.template.as_deref() {
            if self.catalog.get(name).is_none() {
                return Err(ThinkingError::InvalidInput {
                    field: "template".to_string(),
                    reason: format!("unknown template '{name}'"),
                });
            }
        }

        let session_id = Uuid::new_v4().to_string();
        let root = ThoughtNode::root(
            Uuid::new_v4().to_string(),
            &session_id,
            query,
            &request.config.model,
            self.now(),
        );
        let session = ThinkingSession::new(
            &session_id,
            query,
            request.project_id,
            request.user_id,
            request.config,
            &root,
        );

        self.storage
            .apply_commit(&TreeCommit {
                session: session.clone(),
                created: vec![root],
                updated: Vec::new(),
            })
            .await?;

        tracing::info!(
            session_id = %session.id,
            template = ?session.config.template,
            auto_expand = session.config.auto_expand,
            max_tokens = session.config.max_tokens,
            "Started thinking session"
        );
        Ok(session)
    }

    /// Get a session.
    pub async fn get_session(&self, session_id: &str) -> Result<ThinkingSession, ThinkingError> {
        self.load_session(session_id).await
    }

    /// Every node of a session in creation order.
    pub async fn get_tree(&self, session_id: &str) -> Result<Vec<ThoughtNode>, ThinkingError> {
        self.load_session(session_id).await?;
        Ok(self.storage.load_tree(session_id).await?)
    }

    /// Bookmarks of a session in creation order.
    pub async fn list_bookmarks(&self, session_id: &str) -> Result<Vec<Bookmark>, ThinkingError> {
        self.load_session(session_id).await?;
        Ok(self.storage.list_bookmarks(session_id).await?)
    }

    /// Subscribe to a session's events.
    pub async fn stream_events(&self, session_id: &str) -> Result<EventStream, ThinkingError> {
        self.load_session(session_id).await?;
        Ok(self.bus.subscribe(session_id))
    }

    /// All templates in catalog order.
    #[must_use]
    pub fn list_templates(&self) -> &[ReasoningTemplate] {
        self.catalog.list()
    }

    /// Look up a template by name.
    #[must_use]
    pub fn get_template(&self, name: &str) -> Option<&ReasoningTemplate> {
        self.catalog.get(name)
    }

    /// Mark a node as bookmarked and record a bookmark. Allowed in any status.
    pub async fn bookmark(
        &self,
        session_id: &str,
        node_id: &str,
        user_id: Option<String>,
        note: Option<String>,
    ) -> Result<Bookmark, ThinkingError> {
        let _guard = self.locks.acquire(session_id).await;
        self.load_session(session_id).await?;
        let mut node = self.load_node(session_id, node_id).await?;

        let now = self.now();
        node.status = NodeStatus::Bookmarked;
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            user_id,
            session_id: session_id.to_string(),
            node_id: node_id.to_string(),
            note,
            created_at: now,
        };

        self.storage.apply_bookmark(&node, &bookmark).await?;
        tracing::debug!(session_id = %session_id, node_id = %node_id, "Bookmarked node");

        self.emit(ThinkingEvent::NodeUpdated {
            session_id: session_id.to_string(),
            timestamp: now,
            node,
        });
        Ok(bookmark)
    }

    // ------------------------------------------------------------------
    // Shared plumbing for the mutating operations
    // ------------------------------------------------------------------

    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(super) fn emit(&self, event: ThinkingEvent) {
        self.bus.publish(&event);
    }

    pub(super) fn emit_created(&self, nodes: &[ThoughtNode]) {
        let timestamp = self.now();
        for node in nodes {
            self.emit(ThinkingEvent::NodeCreated {
                session_id: node.session_id.clone(),
                timestamp,
                node: node.clone(),
            });
        }
    }

    pub(super) async fn load_session(
        &self,
        session_id: &str,
    ) -> Result<ThinkingSession, ThinkingError> {
        self.storage
            .load_session(session_id)
            .await?
            .ok_or_else(|| ThinkingError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    pub(super) async fn load_node(
        &self,
        session_id: &str,
        node_id: &str,
    ) -> Result<ThoughtNode, ThinkingError> {
        self.storage
            .load_node(session_id, node_id)
            .await?
            .ok_or_else(|| ThinkingError::NodeNotFound {
                session_id: session_id.to_string(),
                node_id: node_id.to_string(),
            })
    }

    /// Fail before inference when the budget is already spent.
    pub(super) async fn ensure_budget(
        &self,
        session: &mut ThinkingSession,
    ) -> Result<(), ThinkingError> {
        if session.stats.tokens_used >= session.config.max_tokens {
            return Err(self.exhaust_budget(session).await);
        }
        Ok(())
    }

    /// Record the cost of `generation`; fail when it overran the budget.
    ///
    /// Spent tokens are kept in the stats even when the result is dropped.
    pub(super) async fn charge(
        &self,
        session: &mut ThinkingSession,
        generation: &Generation,
    ) -> Result<(), ThinkingError> {
        session
            .stats
            .record_usage(generation.tokens, generation.duration_ms);
        if session.stats.tokens_used > session.config.max_tokens {
            return Err(self.exhaust_budget(session).await);
        }
        Ok(())
    }

    /// Pause the session for budget exhaustion and build the error.
    async fn exhaust_budget(&self, session: &mut ThinkingSession) -> ThinkingError {
        let now = self.now();
        session.status = SessionStatus::Paused;
        session.updated_at = now;
        if let Err(e) = self.storage.save_session(session).await {
            return e.into();
        }

        tracing::warn!(
            session_id = %session.id,
            tokens_used = session.stats.tokens_used,
            max_tokens = session.config.max_tokens,
            "Token budget exhausted, pausing session"
        );
        self.emit(ThinkingEvent::SessionPaused {
            session_id: session.id.clone(),
            timestamp: now,
            reason: BUDGET_PAUSE_REASON.to_string(),
        });

        ThinkingError::BudgetExceeded {
            session_id: session.id.clone(),
            tokens_used: session.stats.tokens_used,
            max_tokens: session.config.max_tokens,
        }
    }

    /// One inference call, timed.
    pub(super) async fn infer(
        &self,
        session: &ThinkingSession,
        prompt: String,
        max_tokens: u32,
    ) -> Result<Generation, ThinkingError> {
        let config = CompletionConfig::new()
            .with_max_tokens(max_tokens)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_model(session.config.model.clone());

        let start = Instant::now();
        let response = self
            .client
            .complete(vec![Message::user(prompt)], config)
            .await?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            session_id = %session.id,
            tokens = response.usage.total(),
            elapsed_ms = duration_ms,
            "Inference call completed"
        );
        Ok(Generation {
            text: response.content,
            tokens: response.usage.total(),
            duration_ms,
        })
    }

    /// Metadata for a node produced by `session`.
    pub(super) fn node_metadata(
        &self,
        session: &ThinkingSession,
        tokens_used: u64,
        duration_ms: u64,
        revised_from: Option<String>,
    ) -> NodeMetadata {
        NodeMetadata {
            tokens_used,
            duration_ms,
            model: session.config.model.clone(),
            created_at: self.now(),
            revised_from,
        }
    }
}

/// Tokens to request from one expansion-style call.
pub(super) fn call_budget(session: &ThinkingSession) -> u32 {
    let remaining = session
        .remaining_tokens()
        .min(u64::from(PER_CALL_MAX_TOKENS));
    u32::try_from(remaining).unwrap_or(PER_CALL_MAX_TOKENS).max(1)
}

/// Find a node in a loaded tree.
pub(super) fn find_node<'a>(
    tree: &'a [ThoughtNode],
    session_id: &str,
    node_id: &str,
) -> Result<&'a ThoughtNode, ThinkingError> {
    tree.iter()
        .find(|n| n.id == node_id)
        .ok_or_else(|| ThinkingError::NodeNotFound {
            session_id: session_id.to_string(),
            node_id: node_id.to_string(),
        })
}

/// Root-to-node path, oldest first.
pub(super) fn ancestry<'a>(tree: &'a [ThoughtNode], node_id: &str) -> Vec<&'a ThoughtNode> {
    let by_id: HashMap<&str, &ThoughtNode> = tree.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut path = Vec::new();
    let mut cursor = by_id.get(node_id).copied();
    while let Some(node) = cursor {
        // A well-formed tree never loops; bound the walk anyway.
        if path.len() >= tree.len() {
            break;
        }
        path.push(node);
        cursor = node
            .parent_id
            .as_deref()
            .and_then(|parent_id| by_id.get(parent_id).copied());
    }
    path.reverse();
    path
}
