//! Prompt templates.
//!
//! This module renders the text sent to the inference service for each
//! engine operation:
//! - `context`: system prompt, root-to-node paths, whole-tree outlines
//! - `expansion`: next-thought prompts, template-driven or style-flavored
//! - `review`: critique and alternative-reading prompts
//! - `synthesis`: final conclusion prompt
//!
//! # Example
//!
//! ```
//! use mcp_thinking::prompts::default_step_prompt;
//! use mcp_thinking::thinking::{ThinkingStyle, ThoughtType};
//!
//! let prompt = default_step_prompt(ThoughtType::Hypothesis, ThinkingStyle::Balanced);
//! assert!(prompt.contains("hypothesis"));
//! ```

mod context;
mod expansion;
mod review;
mod synthesis;

pub use context::{render_path, tree_outline, OUTLINE_CONTENT_CHARS, SYSTEM_PROMPT};
pub use expansion::{default_step_prompt, expansion_prompt};
pub use review::{alternatives_prompt, critique_prompt};
pub use synthesis::synthesis_prompt;
