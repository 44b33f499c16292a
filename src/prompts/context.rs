//! Shared prompt context.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::heuristics::truncate_chars;
use crate::thinking::ThoughtNode;

/// System prompt for every engine call.
pub const SYSTEM_PROMPT: &str = "You are a careful reasoning partner building a tree of discrete thoughts about a single question. Each reply is one thought: stay on the question, build on the path you are given, and be explicit about uncertainty. When you can, end with a line of the form \"Confidence: NN%\".";

/// Longest node excerpt in a tree outline, in characters.
pub const OUTLINE_CONTENT_CHARS: usize = 120;

/// Render a root-to-node path, oldest first.
#[must_use]
pub fn render_path(path: &[&ThoughtNode]) -> String {
    let mut out = String::new();
    for (index, node) in path.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{} | confidence {}%] {}",
            index + 1,
            node.thought_type,
            node.confidence,
            node.content.trim()
        );
    }
    out
}

/// Depth-indented outline of every node reachable from `root_id`.
#[must_use]
pub fn tree_outline(nodes: &[ThoughtNode], root_id: &str) -> String {
    let by_id: HashMap<&str, &ThoughtNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut out = String::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root_id];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = by_id.get(id) else {
            continue;
        };
        let excerpt = node.content.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(
            out,
            "{}- [{} | {}%] {}",
            "  ".repeat(node.depth as usize),
            node.thought_type,
            node.confidence,
            truncate_chars(&excerpt, OUTLINE_CONTENT_CHARS)
        );
        stack.extend(node.children.iter().rev().map(String::as_str));
    }
    out
}
