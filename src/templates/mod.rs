//! Reasoning template catalog.
//!
//! This module provides:
//! - [`ReasoningTemplate`] and [`TemplateStep`] definitions
//! - [`TemplateCatalog`], a static read-only registry
//!
//! # Built-in Templates
//!
//! | Template | Category | Steps |
//! |----------|----------|-------|
//! | problem-solving | ProblemSolving | 5 |
//! | debugging | Debugging | 5 |
//! | decision-making | Decision | 5 |
//! | creative-exploration | Creative | 4 |
//! | research-analysis | Research | 6 |
//!
//! A template scripts expansion by depth: the step whose `order` equals
//! `parent.depth + 1` governs the next child.

mod builtin;

use serde::{Deserialize, Serialize};

use crate::thinking::ThoughtType;

/// Category of a reasoning template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    /// General problem solving.
    ProblemSolving,
    /// Fault isolation.
    Debugging,
    /// Choosing between options.
    Decision,
    /// Idea generation.
    Creative,
    /// Source-driven research.
    Research,
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProblemSolving => write!(f, "problem_solving"),
            Self::Debugging => write!(f, "debugging"),
            Self::Decision => write!(f, "decision"),
            Self::Creative => write!(f, "creative"),
            Self::Research => write!(f, "research"),
        }
    }
}

/// A single step of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStep {
    /// 1-based position; matched against `parent.depth + 1`.
    pub order: u32,
    /// Type of the node this step produces.
    #[serde(rename = "type")]
    pub thought_type: ThoughtType,
    /// Instruction text for the model.
    pub prompt: String,
    /// Confidence hint for the auto-expansion threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<u8>,
}

impl TemplateStep {
    /// Create a step without a confidence hint.
    #[must_use]
    pub fn new(order: u32, thought_type: ThoughtType, prompt: impl Into<String>) -> Self {
        Self {
            order,
            thought_type,
            prompt: prompt.into(),
            min_confidence: None,
        }
    }

    /// Add a confidence hint.
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }
}

/// A named, ordered sequence of typed reasoning steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningTemplate {
    /// Unique name.
    pub name: String,
    /// What the template is for.
    pub description: String,
    /// Category.
    pub category: TemplateCategory,
    /// Steps ordered by `order`.
    pub steps: Vec<TemplateStep>,
}

impl ReasoningTemplate {
    /// Create a template.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: TemplateCategory,
        steps: Vec<TemplateStep>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            steps,
        }
    }

    /// Step with the given 1-based order.
    #[must_use]
    pub fn step(&self, order: u32) -> Option<&TemplateStep> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// Step that governs the child of a node at `parent_depth`.
    #[must_use]
    pub fn step_for_child_of(&self, parent_depth: u32) -> Option<&TemplateStep> {
        self.step(parent_depth + 1)
    }
}

/// Static registry of reasoning templates.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<ReasoningTemplate>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// Catalog holding the built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: builtin::templates(),
        }
    }

    /// Catalog over an explicit template list.
    #[must_use]
    pub const fn from_templates(templates: Vec<ReasoningTemplate>) -> Self {
        Self { templates }
    }

    /// Look up a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReasoningTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// All templates in catalog order.
    #[must_use]
    pub fn list(&self) -> &[ReasoningTemplate] {
        &self.templates
    }
}
