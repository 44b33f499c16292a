//! Critique and alternatives prompts.

use crate::thinking::ThoughtNode;

use super::context::render_path;

/// Prompt for a structured critique of the last node in `path`.
#[must_use]
pub fn critique_prompt(query: &str, path: &[&ThoughtNode]) -> String {
    format!(
        "Question: {query}\n\n\
         Reasoning path (oldest first; the last entry is under review):\n{path}\n\
         Critique the thought under review. Cover, briefly:\n\
         1. Strengths\n\
         2. Weaknesses\n\
         3. Faulty or unstated assumptions\n\
         4. Alternative readings of the same facts\n\
         5. Concrete suggestions for improvement\n\n\
         End with a line \"Reasoning: ...\" summarizing your verdict in one sentence \
         and a line \"Confidence: NN%\" for how sound the thought under review is.",
        path = render_path(path),
    )
}

/// Prompt for `count` alternatives to the last node in `path`.
#[must_use]
pub fn alternatives_prompt(query: &str, path: &[&ThoughtNode], count: usize) -> String {
    format!(
        "Question: {query}\n\n\
         Reasoning path (oldest first; the last entry is the target):\n{path}\n\
         Propose exactly {count} alternative readings or conclusions that could replace the \
         target thought. Each must differ materially from the target and from each other.\n\n\
         Respond with a JSON object in this exact format:\n\
         {{\n  \"alternatives\": [\n    {{\n      \"content\": \"The alternative thought\",\n      \
         \"rationale\": \"Why it is worth considering\",\n      \"confidence\": 0.6\n    }}\n  ]\n}}",
        path = render_path(path),
    )
}
