//! Rationale extraction.

use std::sync::LazyLock;

use regex::Regex;

/// Longest rationale kept, in characters.
pub const RATIONALE_MAX_CHARS: usize = 150;

static LABELED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s*_#>-]*(?:reasoning|rationale)[*_]*\s*:[\s*_]*(.+)$").ok()
});

static BECAUSE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bbecause\b[^.!?\n]*").ok());

static FIRST_SENTENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^(.+?[.!?])(?:\s|$)").ok());

/// Short justification for a generated thought.
///
/// Takes a leading `Reasoning:`/`Rationale:` line, else the first
/// "because" clause, else the first sentence, truncated to
/// [`RATIONALE_MAX_CHARS`].
#[must_use]
pub fn extract_rationale(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let labeled = LazyLock::force(&LABELED)
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let because = || {
        LazyLock::force(&BECAUSE)
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str())
    };
    let first_sentence = || {
        LazyLock::force(&FIRST_SENTENCE)
            .as_ref()
            .and_then(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    };

    let picked = labeled
        .or_else(because)
        .or_else(first_sentence)
        .unwrap_or(text);
    let collapsed = picked.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed.trim_matches(|c: char| c == '*' || c == '_').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(truncate_chars(cleaned, RATIONALE_MAX_CHARS))
    }
}

/// Truncate on a character boundary, marking the cut with `...`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
