//! Thought-type progression.

use crate::thinking::{ThinkingStyle, ThoughtType};

/// Style-dependent deviation from the progression table.
///
/// Probabilities are tunable; no particular random sequence is part of
/// the contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypePerturbation {
    /// Chance that a creative session branches into an `alternative`.
    pub creative_alternative: f64,
    /// Chance that an analytical session repeats `analysis` after `analysis`.
    pub analytical_repeat: f64,
}

impl Default for TypePerturbation {
    fn default() -> Self {
        Self {
            creative_alternative: 0.3,
            analytical_repeat: 0.4,
        }
    }
}

impl TypePerturbation {
    /// No deviation at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            creative_alternative: 0.0,
            analytical_repeat: 0.0,
        }
    }
}

/// Successor of `parent` in the fixed progression table.
#[must_use]
pub const fn base_successor(parent: ThoughtType) -> ThoughtType {
    match parent {
        ThoughtType::Observation | ThoughtType::Evidence | ThoughtType::Question => {
            ThoughtType::Analysis
        }
        ThoughtType::Analysis => ThoughtType::Hypothesis,
        ThoughtType::Hypothesis | ThoughtType::Alternative => ThoughtType::Evidence,
        ThoughtType::Critique => ThoughtType::Synthesis,
        ThoughtType::Synthesis => ThoughtType::Conclusion,
        ThoughtType::Conclusion => ThoughtType::Observation,
    }
}

/// Type of the next child of a `parent`-typed node.
///
/// `roll` is a uniform sample in `[0, 1)`.
#[must_use]
pub fn next_thought_type(
    parent: ThoughtType,
    style: ThinkingStyle,
    roll: f64,
    perturbation: &TypePerturbation,
) -> ThoughtType {
    match style {
        ThinkingStyle::Creative
            if parent != ThoughtType::Alternative && roll < perturbation.creative_alternative =>
        {
            ThoughtType::Alternative
        }
        ThinkingStyle::Analytical
            if parent == ThoughtType::Analysis && roll < perturbation.analytical_repeat =>
        {
            ThoughtType::Analysis
        }
        _ => base_successor(parent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(ThoughtType::Observation, ThoughtType::Analysis)]
    #[test_case(ThoughtType::Analysis, ThoughtType::Hypothesis)]
    #[test_case(ThoughtType::Hypothesis, ThoughtType::Evidence)]
    #[test_case(ThoughtType::Evidence, ThoughtType::Analysis)]
    #[test_case(ThoughtType::Critique, ThoughtType::Synthesis)]
    #[test_case(ThoughtType::Synthesis, ThoughtType::Conclusion)]
    #[test_case(ThoughtType::Conclusion, ThoughtType::Observation)]
    #[test_case(ThoughtType::Question, ThoughtType::Analysis)]
    #[test_case(ThoughtType::Alternative, ThoughtType::Evidence)]
    fn test_base_successor(parent: ThoughtType, expected: ThoughtType) {
        assert_eq!(base_successor(parent), expected);
    }

    #[test]
    fn test_creative_low_roll_branches() {
        let p = TypePerturbation::default();
        assert_eq!(
            next_thought_type(ThoughtType::Observation, ThinkingStyle::Creative, 0.1, &p),
            ThoughtType::Alternative
        );
        assert_eq!(
            next_thought_type(ThoughtType::Observation, ThinkingStyle::Creative, 0.9, &p),
            ThoughtType::Analysis
        );
    }

    #[test]
    fn test_creative_does_not_chain_alternatives() {
        let p = TypePerturbation::default();
        assert_eq!(
            next_thought_type(ThoughtType::Alternative, ThinkingStyle::Creative, 0.0, &p),
            ThoughtType::Evidence
        );
    }

    #[test]
    fn test_analytical_repeats_analysis() {
        let p = TypePerturbation::default();
        assert_eq!(
            next_thought_type(ThoughtType::Analysis, ThinkingStyle::Analytical, 0.2, &p),
            ThoughtType::Analysis
        );
        assert_eq!(
            next_thought_type(ThoughtType::Hypothesis, ThinkingStyle::Analytical, 0.2, &p),
            ThoughtType::Evidence
        );
    }

    proptest! {
        #[test]
        fn prop_balanced_follows_table(index in 0usize..9, roll in 0.0f64..1.0) {
            let parent = ThoughtType::ALL[index];
            let next = next_thought_type(parent, ThinkingStyle::Balanced, roll, &TypePerturbation::default());
            prop_assert_eq!(next, base_successor(parent));
        }

        #[test]
        fn prop_no_perturbation_follows_table(index in 0usize..9, roll in 0.0f64..1.0) {
            let parent = ThoughtType::ALL[index];
            for style in [ThinkingStyle::Analytical, ThinkingStyle::Creative] {
                let next = next_thought_type(parent, style, roll, &TypePerturbation::none());
                prop_assert_eq!(next, base_successor(parent));
            }
        }
    }
}
