//! Thinking session data model.
//!
//! - [`ThinkingSession`]: one reasoning run over a single query
//! - [`ThinkingConfig`]: per-session budget and feature flags
//! - [`ThoughtNode`]: one typed, confidence-scored step in the tree
//! - [`SessionStats`]: running totals embedded in a session
//! - [`Bookmark`]: a user marker on a node
//! - [`TreeCommit`]: an atomic batch of session and node writes

#![allow(clippy::should_implement_trait)]

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_MODEL, DEFAULT_THINKING_MAX_BRANCHES, DEFAULT_THINKING_MAX_DEPTH,
    DEFAULT_THINKING_MAX_TOKENS, DEFAULT_THINKING_MIN_CONFIDENCE, MAX_BRANCHES_LIMIT,
};
use crate::error::ThinkingError;

/// Confidence assigned to the root node.
pub const ROOT_CONFIDENCE: u8 = 50;

/// Type tag of a thought node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtType {
    /// Something noticed about the problem.
    Observation,
    /// A candidate explanation.
    Hypothesis,
    /// Breaking a point down.
    Analysis,
    /// An evaluation of another thought.
    Critique,
    /// A settled answer.
    Conclusion,
    /// An open question.
    Question,
    /// Support for or against a hypothesis.
    Evidence,
    /// A competing reading of a sibling.
    Alternative,
    /// A combination of earlier thoughts.
    Synthesis,
}

impl ThoughtType {
    /// Every type, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Observation,
        Self::Hypothesis,
        Self::Analysis,
        Self::Critique,
        Self::Conclusion,
        Self::Question,
        Self::Evidence,
        Self::Alternative,
        Self::Synthesis,
    ];

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Hypothesis => "hypothesis",
            Self::Analysis => "analysis",
            Self::Critique => "critique",
            Self::Conclusion => "conclusion",
            Self::Question => "question",
            Self::Evidence => "evidence",
            Self::Alternative => "alternative",
            Self::Synthesis => "synthesis",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for ThoughtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status tag of a thought node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Open for further expansion.
    #[default]
    Exploring,
    /// Finished.
    Completed,
    /// Given up on.
    Abandoned,
    /// Marked by a user.
    Bookmarked,
    /// Superseded by a revision.
    Revised,
}

impl NodeStatus {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
            Self::Bookmarked => "bookmarked",
            Self::Revised => "revised",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exploring" => Some(Self::Exploring),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            "bookmarked" => Some(Self::Bookmarked),
            "revised" => Some(Self::Revised),
            _ => None,
        }
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting tree operations.
    #[default]
    Thinking,
    /// Reversible hold.
    Paused,
    /// Closed by synthesis.
    Completed,
    /// Closed by an unrecoverable error.
    Failed,
}

impl SessionStatus {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Thinking => "thinking",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "thinking" => Some(Self::Thinking),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasoning style; flavors default prompts and type progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingStyle {
    /// Favors repeated analysis.
    Analytical,
    /// Favors branching into alternatives.
    Creative,
    /// Follows the progression table unchanged.
    #[default]
    Balanced,
}

impl ThinkingStyle {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analytical => "analytical",
            Self::Creative => "creative",
            Self::Balanced => "balanced",
        }
    }

    /// Parse from string.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "analytical" => Some(Self::Analytical),
            "creative" => Some(Self::Creative),
            "balanced" => Some(Self::Balanced),
            _ => None,
        }
    }
}

/// Per-session configuration, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Total token ceiling.
    pub max_tokens: u64,
    /// Maximum tree depth.
    pub max_depth: u32,
    /// Maximum children per expansion call.
    pub max_branches: u32,
    /// Confidence required for the auto loop to keep expanding.
    pub min_confidence_threshold: u8,
    /// Allow `Critique`.
    pub enable_self_critique: bool,
    /// Allow `ExploreAlternatives`.
    pub enable_parallel_exploration: bool,
    /// Drive expansion without caller calls.
    pub auto_expand: bool,
    /// Template name, if one scripts the expansion.
    pub template: Option<String>,
    /// Inference model identifier.
    pub model: String,
    /// Reasoning style.
    #[serde(default)]
    pub style: ThinkingStyle,
}

impl Default for ThinkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_THINKING_MAX_TOKENS,
            max_depth: DEFAULT_THINKING_MAX_DEPTH,
            max_branches: DEFAULT_THINKING_MAX_BRANCHES,
            min_confidence_threshold: DEFAULT_THINKING_MIN_CONFIDENCE,
            enable_self_critique: true,
            enable_parallel_exploration: true,
            auto_expand: false,
            template: None,
            model: DEFAULT_MODEL.to_string(),
            style: ThinkingStyle::Balanced,
        }
    }
}

impl ThinkingConfig {
    /// Set the token ceiling.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the depth ceiling.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the branching ceiling.
    #[must_use]
    pub const fn with_max_branches(mut self, max_branches: u32) -> Self {
        self.max_branches = max_branches;
        self
    }

    /// Set the auto-expansion confidence threshold.
    #[must_use]
    pub const fn with_min_confidence(mut self, threshold: u8) -> Self {
        self.min_confidence_threshold = threshold;
        self
    }

    /// Enable or disable auto-expansion.
    #[must_use]
    pub const fn with_auto_expand(mut self, auto_expand: bool) -> Self {
        self.auto_expand = auto_expand;
        self
    }

    /// Enable or disable `Critique`.
    #[must_use]
    pub const fn with_self_critique(mut self, enabled: bool) -> Self {
        self.enable_self_critique = enabled;
        self
    }

    /// Enable or disable `ExploreAlternatives`.
    #[must_use]
    pub const fn with_parallel_exploration(mut self, enabled: bool) -> Self {
        self.enable_parallel_exploration = enabled;
        self
    }

    /// Activate a template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set the style.
    #[must_use]
    pub const fn with_style(mut self, style: ThinkingStyle) -> Self {
        self.style = style;
        self
    }

    /// Reject budgets that could never admit a node.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkingError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<(), ThinkingError> {
        let invalid = |field: &str, reason: String| ThinkingError::InvalidInput {
            field: field.to_string(),
            reason,
        };
        if self.max_tokens == 0 {
            return Err(invalid("max_tokens", "must be positive".into()));
        }
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be positive".into()));
        }
        if !(1..=MAX_BRANCHES_LIMIT).contains(&self.max_branches) {
            return Err(invalid(
                "max_branches",
                format!("must be between 1 and {MAX_BRANCHES_LIMIT}"),
            ));
        }
        if self.min_confidence_threshold > 100 {
            return Err(invalid(
                "min_confidence_threshold",
                "must be at most 100".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(invalid("model", "must not be empty".into()));
        }
        Ok(())
    }
}

/// Per-node bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Tokens consumed producing this node.
    pub tokens_used: u64,
    /// Wall-clock duration of the producing call.
    pub duration_ms: u64,
    /// Model that produced the node.
    pub model: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Node this one revises, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_from: Option<String>,
}

/// One step of reasoning in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtNode {
    /// Unique node identifier.
    pub id: String,
    /// Parent node; `None` only for the root.
    pub parent_id: Option<String>,
    /// Owning session.
    pub session_id: String,
    /// Generated text.
    pub content: String,
    /// Type tag.
    #[serde(rename = "type")]
    pub thought_type: ThoughtType,
    /// Confidence, 0-100.
    pub confidence: u8,
    /// Root is 0; each child is parent + 1.
    pub depth: u32,
    /// Ordered child ids.
    pub children: Vec<String>,
    /// Status tag.
    pub status: NodeStatus,
    /// Short justification.
    pub rationale: Option<String>,
    /// Advisory links to sibling alternatives.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Per-node bookkeeping.
    pub metadata: NodeMetadata,
}

impl ThoughtNode {
    /// Create the root node of a session.
    #[must_use]
    pub fn root(
        id: impl Into<String>,
        session_id: impl Into<String>,
        query: impl Into<String>,
        model: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            session_id: session_id.into(),
            content: query.into(),
            thought_type: ThoughtType::Observation,
            confidence: ROOT_CONFIDENCE,
            depth: 0,
            children: Vec::new(),
            status: NodeStatus::Exploring,
            rationale: None,
            alternatives: Vec::new(),
            metadata: NodeMetadata {
                tokens_used: 0,
                duration_ms: 0,
                model: model.into(),
                created_at,
                revised_from: None,
            },
        }
    }

    /// Create a child of `parent`. The parent's `children` list is not touched.
    #[must_use]
    pub fn child_of(
        parent: &Self,
        id: impl Into<String>,
        content: impl Into<String>,
        thought_type: ThoughtType,
        confidence: u8,
        metadata: NodeMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent.id.clone()),
            session_id: parent.session_id.clone(),
            content: content.into(),
            thought_type,
            confidence: confidence.min(100),
            depth: parent.depth + 1,
            children: Vec::new(),
            status: NodeStatus::Exploring,
            rationale: None,
            alternatives: Vec::new(),
            metadata,
        }
    }

    /// Set the rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: Option<String>) -> Self {
        self.rationale = rationale;
        self
    }

    /// True for the root node.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Append a child id. Returns false if it was already present.
    pub fn add_child(&mut self, child_id: &str) -> bool {
        if self.children.iter().any(|c| c == child_id) {
            return false;
        }
        self.children.push(child_id.to_string());
        true
    }

    /// Append an alternative link. Returns false if it was already present.
    pub fn add_alternative(&mut self, node_id: &str) -> bool {
        if self.alternatives.iter().any(|a| a == node_id) {
            return false;
        }
        self.alternatives.push(node_id.to_string());
        true
    }
}

/// Running totals embedded in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionStats {
    /// Tokens consumed across all calls.
    pub tokens_used: u64,
    /// Wall-clock duration across all calls.
    pub duration_ms: u64,
    /// Nodes explored, the root included.
    pub branches_explored: u32,
    /// Critiques produced.
    pub revisions: u32,
    /// Mean of `confidence_trend`.
    pub average_confidence: f64,
    /// Confidence of every node in creation order.
    pub confidence_trend: Vec<u8>,
    /// Node count per type.
    pub node_type_counts: BTreeMap<ThoughtType, u32>,
    /// Deepest node so far.
    pub max_depth_reached: u32,
}

impl SessionStats {
    /// Stats for a fresh session holding only its root node.
    #[must_use]
    pub fn for_root(root: &ThoughtNode) -> Self {
        let mut stats = Self::default();
        stats.record_node(root);
        stats
    }

    /// Fold a newly created node into the totals.
    pub fn record_node(&mut self, node: &ThoughtNode) {
        self.branches_explored += 1;
        self.confidence_trend.push(node.confidence);
        self.average_confidence = mean(&self.confidence_trend);
        *self.node_type_counts.entry(node.thought_type).or_insert(0) += 1;
        self.max_depth_reached = self.max_depth_reached.max(node.depth);
    }

    /// Record the cost of one inference call.
    pub fn record_usage(&mut self, tokens: u64, duration_ms: u64) {
        self.tokens_used = self.tokens_used.saturating_add(tokens);
        self.duration_ms = self.duration_ms.saturating_add(duration_ms);
    }

    /// Total number of nodes counted by type.
    #[must_use]
    pub fn node_count(&self) -> u32 {
        self.node_type_counts.values().sum()
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    sum as f64 / values.len() as f64
}

/// One end-to-end reasoning run over a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingSession {
    /// Unique session identifier.
    pub id: String,
    /// Owning user, if known.
    pub user_id: Option<String>,
    /// Owning project.
    pub project_id: String,
    /// Original query text.
    pub query: String,
    /// Root node; immutable after creation.
    pub root_node_id: String,
    /// Last-touched node; default expansion point.
    pub current_node_id: String,
    /// Configuration fixed at creation.
    pub config: ThinkingConfig,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Running totals.
    pub stats: SessionStats,
    /// Set by synthesis.
    pub final_conclusion: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Set when synthesis completes the session.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ThinkingSession {
    /// Create a session in `thinking` status around its root node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        query: impl Into<String>,
        project_id: impl Into<String>,
        user_id: Option<String>,
        config: ThinkingConfig,
        root: &ThoughtNode,
    ) -> Self {
        let now = root.metadata.created_at;
        Self {
            id: id.into(),
            user_id,
            project_id: project_id.into(),
            query: query.into(),
            root_node_id: root.id.clone(),
            current_node_id: root.id.clone(),
            config,
            status: SessionStatus::Thinking,
            stats: SessionStats::for_root(root),
            final_conclusion: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Fail with `InvalidState` unless the status is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkingError::InvalidState`] naming `operation`.
    pub fn ensure_status(
        &self,
        allowed: &[SessionStatus],
        operation: &str,
    ) -> Result<(), ThinkingError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    /// Build an `InvalidState` error for this session.
    #[must_use]
    pub fn invalid_state(&self, operation: &str) -> ThinkingError {
        ThinkingError::InvalidState {
            session_id: self.id.clone(),
            status: self.status.as_str().to_string(),
            operation: operation.to_string(),
        }
    }

    /// Tokens left before the ceiling.
    #[must_use]
    pub const fn remaining_tokens(&self) -> u64 {
        self.config.max_tokens.saturating_sub(self.stats.tokens_used)
    }

    /// Advance the current node and fold it into the stats.
    pub fn record_node(&mut self, node: &ThoughtNode, now: DateTime<Utc>) {
        self.current_node_id.clone_from(&node.id);
        self.stats.record_node(node);
        self.updated_at = now;
    }
}

/// A user marker on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique bookmark identifier.
    pub id: String,
    /// User who placed the bookmark.
    pub user_id: Option<String>,
    /// Session of the node.
    pub session_id: String,
    /// Marked node.
    pub node_id: String,
    /// Free-form note.
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Session upsert plus node inserts and updates, applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeCommit {
    /// Session record after the mutation.
    pub session: ThinkingSession,
    /// Nodes to insert.
    pub created: Vec<ThoughtNode>,
    /// Existing nodes to overwrite.
    pub updated: Vec<ThoughtNode>,
}

impl TreeCommit {
    /// A commit that only rewrites the session record.
    #[must_use]
    pub const fn session_only(session: ThinkingSession) -> Self {
        Self {
            session,
            created: Vec::new(),
            updated: Vec::new(),
        }
    }
}
