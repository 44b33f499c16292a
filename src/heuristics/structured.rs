//! Structured model output.

use serde_json::Value;

use super::confidence::DEFAULT_CONFIDENCE;
use super::rationale::{extract_rationale, truncate_chars};
use crate::error::ThinkingError;

/// One alternative parsed from model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeDraft {
    /// Alternative text.
    pub content: String,
    /// Supplied or inferred rationale.
    pub rationale: Option<String>,
    /// Confidence, 0-100.
    pub confidence: u8,
}

/// Extract a JSON value from model output.
///
/// Accepts raw JSON, a fenced ```json block, a generic fenced block, or
/// the first balanced object/array embedded in prose.
///
/// # Errors
///
/// Returns [`ThinkingError::ParseError`] with a truncated preview.
pub fn extract_json(text: &str) -> Result<Value, ThinkingError> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let candidate = from_code_block(trimmed, "```json")
        .or_else(|| from_code_block(trimmed, "```"))
        .or_else(|| embedded(trimmed));

    match candidate {
        Some(json) => serde_json::from_str(json).map_err(|e| ThinkingError::ParseError {
            message: format!("invalid JSON: {e}. Preview: {}", preview(text)),
        }),
        None => Err(ThinkingError::ParseError {
            message: format!("no JSON found in response: {}", preview(text)),
        }),
    }
}

/// Parse exactly `count` alternatives.
///
/// The value may be `{"alternatives": [...]}` or a bare array; entries are
/// objects with `content` (or `text`), optional `rationale` and optional
/// `confidence`, or plain strings. Entries with empty content are skipped
/// and extras beyond `count` are ignored.
///
/// # Errors
///
/// Returns [`ThinkingError::ParseError`] if the output is not such a list
/// or holds fewer than `count` usable entries.
pub fn parse_alternatives(text: &str, count: usize) -> Result<Vec<AlternativeDraft>, ThinkingError> {
    let value = extract_json(text)?;
    let entries = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("alternatives") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ThinkingError::ParseError {
                    message: "expected an \"alternatives\" array".to_string(),
                })
            }
        },
        _ => {
            return Err(ThinkingError::ParseError {
                message: "expected a JSON array or object".to_string(),
            })
        }
    };

    let drafts: Vec<AlternativeDraft> = entries.iter().filter_map(draft).take(count).collect();
    if drafts.len() < count {
        return Err(ThinkingError::ParseError {
            message: format!(
                "expected {count} alternatives, found {} usable",
                drafts.len()
            ),
        });
    }
    Ok(drafts)
}

fn draft(entry: &Value) -> Option<AlternativeDraft> {
    let (content, rationale, confidence) = match entry {
        Value::String(s) => (s.as_str(), None, None),
        Value::Object(map) => (
            map.get("content")
                .or_else(|| map.get("text"))
                .and_then(Value::as_str)?,
            map.get("rationale").and_then(Value::as_str),
            map.get("confidence"),
        ),
        _ => return None,
    };

    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    let rationale = rationale
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .or_else(|| extract_rationale(content));

    Some(AlternativeDraft {
        content: content.to_string(),
        rationale,
        confidence: confidence.map_or(DEFAULT_CONFIDENCE, normalize_confidence),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_confidence(value: &Value) -> u8 {
    let Some(raw) = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim_end_matches('%').trim().parse().ok()))
    else {
        return DEFAULT_CONFIDENCE;
    };
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
    percent.round().clamp(0.0, 100.0) as u8
}

fn from_code_block<'a>(text: &'a str, fence: &str) -> Option<&'a str> {
    let start = text.find(fence)? + fence.len();
    let rest = text[start..].trim_start();
    let end = rest.find("```")?;
    let body = rest[..end].trim();
    (!body.is_empty()).then_some(body)
}

/// The balanced object or array that opens first in the text.
fn embedded(text: &str) -> Option<&str> {
    let object = text.find('{');
    let array = text.find('[');
    let (first, second) = match (object, array) {
        (Some(o), Some(a)) if a < o => (('[', ']'), ('{', '}')),
        (None, Some(_)) => (('[', ']'), ('{', '}')),
        _ => (('{', '}'), ('[', ']')),
    };
    balanced(text, first.0, first.1).or_else(|| balanced(text, second.0, second.1))
}

fn balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if !in_string && c == open => depth += 1,
            c if !in_string && c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn preview(text: &str) -> String {
    truncate_chars(text.trim(), 100)
}
