//! Final conclusion prompt.

use crate::thinking::SessionStats;

/// Prompt asking for a conclusion-first final answer over the whole tree.
#[must_use]
pub fn synthesis_prompt(query: &str, outline: &str, stats: &SessionStats) -> String {
    format!(
        "Question: {query}\n\n\
         Thought tree (indented by depth; type and confidence in brackets):\n{outline}\n\
         Session statistics: {nodes} thoughts, maximum depth {depth}, {revisions} critiques, \
         average confidence {average:.0}%.\n\n\
         Write the final answer. Start with the conclusion in one or two sentences. \
         Then give the reasoning that supports it, drawing on the strongest branches. \
         Finish by acknowledging the main uncertainties and what would change your mind.",
        nodes = stats.node_count(),
        depth = stats.max_depth_reached,
        revisions = stats.revisions,
        average = stats.average_confidence,
    )
}
