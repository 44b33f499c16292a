//! Confidence and type heuristics.
//!
//! Pure functions over generated text, kept apart from tree mutation:
//! - [`extract_confidence`]: explicit "confidence: NN%" or lexicon inference
//! - [`extract_rationale`]: labeled or "because" clause, else first sentence
//! - [`next_thought_type`]: progression table with style perturbation
//! - [`parse_alternatives`]: structured alternative list from model output
//!
//! All results are best-effort; the numeric defaults are documented on the
//! constants below.

mod confidence;
mod progression;
mod rationale;
mod structured;

pub use confidence::{
    explicit_confidence, extract_confidence, lexicon_confidence, CRITIQUE_BASELINE_CONFIDENCE,
    DEFAULT_CONFIDENCE, HIGH_CONFIDENCE, LOW_CONFIDENCE, MEDIUM_CONFIDENCE,
};
pub use progression::{base_successor, next_thought_type, TypePerturbation};
pub use rationale::{extract_rationale, truncate_chars, RATIONALE_MAX_CHARS};
pub use structured::{extract_json, parse_alternatives, AlternativeDraft};

/// Confidence and rationale inferred from one generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    /// Confidence, 0-100.
    pub confidence: u8,
    /// Short justification, if any text was present.
    pub rationale: Option<String>,
}

/// Assess an expansion result.
#[must_use]
pub fn assess(text: &str) -> Assessment {
    Assessment {
        confidence: extract_confidence(text),
        rationale: extract_rationale(text),
    }
}

/// Assess a critique; confidence falls back to [`CRITIQUE_BASELINE_CONFIDENCE`].
#[must_use]
pub fn assess_critique(text: &str) -> Assessment {
    Assessment {
        confidence: explicit_confidence(text).unwrap_or(CRITIQUE_BASELINE_CONFIDENCE),
        rationale: extract_rationale(text),
    }
}
