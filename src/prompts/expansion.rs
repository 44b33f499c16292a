//! Next-thought prompts.

use crate::thinking::{ThinkingStyle, ThoughtNode, ThoughtType};

use super::context::render_path;

/// Style-flavored instruction for a thought of type `thought_type`.
#[must_use]
pub fn default_step_prompt(thought_type: ThoughtType, style: ThinkingStyle) -> String {
    let base = match thought_type {
        ThoughtType::Observation => {
            "Write an observation: state one concrete fact or pattern relevant to the question that the path has not yet covered."
        }
        ThoughtType::Hypothesis => {
            "Write a hypothesis: propose one specific, testable explanation or answer that follows from the path."
        }
        ThoughtType::Analysis => {
            "Write an analysis: break the most recent thought into its parts and examine how they relate."
        }
        ThoughtType::Critique => {
            "Write a critique: identify the weakest assumption in the path and explain why it might fail."
        }
        ThoughtType::Conclusion => {
            "Write a conclusion: state the answer the path supports and the main caveat attached to it."
        }
        ThoughtType::Question => {
            "Write a question: ask the single most useful unanswered question raised by the path."
        }
        ThoughtType::Evidence => {
            "Write evidence: give a concrete example, data point, or argument that supports or undermines the latest hypothesis."
        }
        ThoughtType::Alternative => {
            "Write an alternative: offer a materially different reading of the latest thought."
        }
        ThoughtType::Synthesis => {
            "Write a synthesis: combine the strongest points of the path into one coherent position."
        }
    };
    let flavor = match style {
        ThinkingStyle::Analytical => {
            " Be rigorous and precise; prefer step-by-step logic over intuition."
        }
        ThinkingStyle::Creative => {
            " Be inventive; an unconventional angle is welcome if it stays relevant."
        }
        ThinkingStyle::Balanced => "",
    };
    format!("{base}{flavor}")
}

/// Prompt for the next child of the last node in `path`.
///
/// `step_prompt` is the template step text when a template is active.
#[must_use]
pub fn expansion_prompt(
    query: &str,
    path: &[&ThoughtNode],
    thought_type: ThoughtType,
    style: ThinkingStyle,
    step_prompt: Option<&str>,
) -> String {
    let instruction =
        step_prompt.map_or_else(|| default_step_prompt(thought_type, style), ToString::to_string);
    format!(
        "Question: {query}\n\n\
         Reasoning path so far (oldest first):\n{path}\n\
         Next thought type: {thought_type}\n\
         {instruction}\n\n\
         Reply with the thought itself in a short paragraph, then a line \"Reasoning: ...\" \
         giving your justification in one sentence, then a line \"Confidence: NN%\".",
        path = render_path(path),
    )
}
