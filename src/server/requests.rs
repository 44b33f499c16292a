//! Request types for thinking tools.
//!
//! This module contains all request types with JsonSchema support for tool parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ThinkingError;
use crate::thinking::{ThinkingConfig, ThinkingStyle};

/// Project used when a caller does not name one.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Request to start a thinking session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartRequest {
    /// Question to reason about.
    pub query: String,
    /// Owning project (default "default").
    pub project_id: Option<String>,
    /// Owning user.
    pub user_id: Option<String>,
    /// Total token ceiling.
    pub max_tokens: Option<u64>,
    /// Maximum tree depth.
    pub max_depth: Option<u32>,
    /// Maximum children per expansion (1-10).
    pub max_branches: Option<u32>,
    /// Confidence (0-100) the auto loop needs to keep expanding.
    pub min_confidence_threshold: Option<u8>,
    /// Allow critiques (default true).
    pub enable_self_critique: Option<bool>,
    /// Allow alternatives (default true).
    pub enable_parallel_exploration: Option<bool>,
    /// Expand without further calls until a stopping condition.
    pub auto_expand: Option<bool>,
    /// Template name; see `thinking_templates`.
    pub template: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Style: analytical/creative/balanced.
    pub style: Option<String>,
}

impl StartRequest {
    /// Overlay the request's settings on `defaults`.
    ///
    /// # Errors
    ///
    /// Returns [`ThinkingError::InvalidInput`] for an unknown style.
    pub fn thinking_config(&self, defaults: ThinkingConfig) -> Result<ThinkingConfig, ThinkingError> {
        let mut config = defaults;
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_branches) = self.max_branches {
            config.max_branches = max_branches;
        }
        if let Some(threshold) = self.min_confidence_threshold {
            config.min_confidence_threshold = threshold;
        }
        if let Some(enabled) = self.enable_self_critique {
            config.enable_self_critique = enabled;
        }
        if let Some(enabled) = self.enable_parallel_exploration {
            config.enable_parallel_exploration = enabled;
        }
        if let Some(auto_expand) = self.auto_expand {
            config.auto_expand = auto_expand;
        }
        if let Some(template) = &self.template {
            config.template = Some(template.clone());
        }
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(style) = &self.style {
            config.style =
                ThinkingStyle::from_str(style).ok_or_else(|| ThinkingError::InvalidInput {
                    field: "style".to_string(),
                    reason: format!("unknown style '{style}'"),
                })?;
        }
        Ok(config)
    }
}

/// Request to expand a node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExpandRequest {
    /// Session ID.
    pub session_id: String,
    /// Node to expand (default: the session's current node).
    pub node_id: Option<String>,
    /// Number of children (clamped to 1..=max_branches, default 1).
    pub count: Option<u32>,
}

/// Request to critique a node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CritiqueRequest {
    /// Session ID.
    pub session_id: String,
    /// Node to critique (default: the session's current node).
    pub node_id: Option<String>,
}

/// Request for alternatives to a node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlternativesRequest {
    /// Session ID.
    pub session_id: String,
    /// Node whose siblings to generate.
    pub node_id: String,
    /// Number of alternatives (clamped to 1..=max_branches, default 2).
    pub count: Option<u32>,
}

/// Request naming one session.
///
/// Used by pause, resume, synthesize, tree and session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionRequest {
    /// Session ID.
    pub session_id: String,
}

/// Request to bookmark a node.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookmarkRequest {
    /// Session ID.
    pub session_id: String,
    /// Node to bookmark.
    pub node_id: String,
    /// User placing the bookmark.
    pub user_id: Option<String>,
    /// Free-form note.
    pub note: Option<String>,
}

/// Request for templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TemplatesRequest {
    /// Return only this template.
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_request_minimal_deserialize() {
        let req: StartRequest = serde_json::from_str(r#"{"query": "why?"}"#).unwrap();
        assert_eq!(req.query, "why?");
        assert!(req.project_id.is_none());
        assert!(req.auto_expand.is_none());
    }

    #[test]
    fn test_thinking_config_overlays_defaults() {
        let req = StartRequest {
            query: "q".into(),
            max_depth: Some(4),
            auto_expand: Some(true),
            template: Some("debugging".into()),
            style: Some("creative".into()),
            ..StartRequest::default()
        };
        let defaults = ThinkingConfig::default();
        let config = req.thinking_config(defaults.clone()).unwrap();
        assert_eq!(config.max_depth, 4);
        assert!(config.auto_expand);
        assert_eq!(config.template.as_deref(), Some("debugging"));
        assert_eq!(config.style, ThinkingStyle::Creative);
        assert_eq!(config.max_tokens, defaults.max_tokens);
    }

    #[test]
    fn test_thinking_config_rejects_unknown_style() {
        let req = StartRequest {
            query: "q".into(),
            style: Some("chaotic".into()),
            ..StartRequest::default()
        };
        let err = req.thinking_config(ThinkingConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_request_types_implement_json_schema() {
        let _ = schemars::schema_for!(StartRequest);
        let _ = schemars::schema_for!(ExpandRequest);
        let _ = schemars::schema_for!(CritiqueRequest);
        let _ = schemars::schema_for!(AlternativesRequest);
        let _ = schemars::schema_for!(SessionRequest);
        let _ = schemars::schema_for!(BookmarkRequest);
        let _ = schemars::schema_for!(TemplatesRequest);
    }
}
