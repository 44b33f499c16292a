//! Confidence extraction.

use std::sync::LazyLock;

use regex::Regex;

/// Used when the text carries no explicit value and no certainty language.
pub const DEFAULT_CONFIDENCE: u8 = 60;

/// Certainty language dominated by high markers.
pub const HIGH_CONFIDENCE: u8 = 85;

/// Mixed or hedged certainty language.
pub const MEDIUM_CONFIDENCE: u8 = 65;

/// Certainty language dominated by low markers.
pub const LOW_CONFIDENCE: u8 = 40;

/// Critique nodes without an explicit value.
pub const CRITIQUE_BASELINE_CONFIDENCE: u8 = 75;

// "Confidence: 85%", "confidence level is 0.8", "**Confidence** = 70"
static LABELED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bconfidence(?:\s+(?:level|score))?\s*[*_]*\s*(?:[:=]|\bis\b|\bof\b)\s*[*_]*\s*(\d{1,3}(?:\.\d+)?)\s*%?",
    )
    .ok()
});

// "85% confident", "90% confidence"
static SUFFIXED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3}(?:\.\d+)?)\s*%\s*confiden").ok());

static HIGH_MARKERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:certainly|definitely|clearly|undoubtedly|confirmed|conclusively|obviously|strongly|without doubt|must be|always)\b",
    )
    .ok()
});

static MEDIUM_MARKERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:likely|probably|suggests|appears|seems|reasonable|plausible|indicates|generally|typically)\b",
    )
    .ok()
});

static LOW_MARKERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:might|maybe|possibly|perhaps|uncertain|unclear|speculative|unsure|doubtful|could be|not sure)\b",
    )
    .ok()
});

/// Infer a confidence score, preferring an explicit value.
#[must_use]
pub fn extract_confidence(text: &str) -> u8 {
    explicit_confidence(text).unwrap_or_else(|| lexicon_confidence(text))
}

/// Confidence stated explicitly in the text, normalized to 0-100.
///
/// Values written as fractions (`0.8`) are read as probabilities.
#[must_use]
pub fn explicit_confidence(text: &str) -> Option<u8> {
    [&LABELED, &SUFFIXED]
        .into_iter()
        .filter_map(|re| LazyLock::force(re).as_ref())
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| normalize(m.as_str()))
}

/// Confidence inferred from certainty-language markers.
#[must_use]
pub fn lexicon_confidence(text: &str) -> u8 {
    let high = count(&HIGH_MARKERS, text);
    let medium = count(&MEDIUM_MARKERS, text);
    let low = count(&LOW_MARKERS, text);

    if high == 0 && medium == 0 && low == 0 {
        DEFAULT_CONFIDENCE
    } else if high > medium && high > low {
        HIGH_CONFIDENCE
    } else if low > high && low >= medium {
        LOW_CONFIDENCE
    } else {
        MEDIUM_CONFIDENCE
    }
}

fn count(re: &LazyLock<Option<Regex>>, text: &str) -> usize {
    LazyLock::force(re)
        .as_ref()
        .map_or(0, |re| re.find_iter(text).count())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize(raw: &str) -> Option<u8> {
    let value: f64 = raw.parse().ok()?;
    let percent = if raw.contains('.') && value <= 1.0 {
        value * 100.0
    } else {
        value
    };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("Confidence: 85%", Some(85) ; "labeled percent")]
    #[test_case("confidence level is 72", Some(72) ; "level is")]
    #[test_case("**Confidence**: 90%", Some(90) ; "markdown bold")]
    #[test_case("Confidence = 0.8", Some(80) ; "fraction")]
    #[test_case("I am 70% confident in this", Some(70) ; "suffixed")]
    #[test_case("Confidence: 250%", Some(100) ; "clamped")]
    #[test_case("confidence in step 2 is shaky", None ; "number not a score")]
    #[test_case("no score here", None ; "absent")]
    fn test_explicit_confidence(text: &str, expected: Option<u8>) {
        assert_eq!(explicit_confidence(text), expected);
    }

    #[test_case("This is definitely the cause and clearly confirmed.", HIGH_CONFIDENCE ; "high")]
    #[test_case("It is likely a race and probably in the scheduler.", MEDIUM_CONFIDENCE ; "medium")]
    #[test_case("It might be the disk, perhaps, but it is unclear.", LOW_CONFIDENCE ; "low")]
    #[test_case("Definitely maybe.", MEDIUM_CONFIDENCE ; "tie")]
    #[test_case("The service returns 500 on POST.", DEFAULT_CONFIDENCE ; "neutral")]
    fn test_lexicon_confidence(text: &str, expected: u8) {
        assert_eq!(lexicon_confidence(text), expected);
    }

    #[test]
    fn test_explicit_beats_lexicon() {
        assert_eq!(
            extract_confidence("It might be the disk. Confidence: 90%"),
            90
        );
    }

    proptest! {
        #[test]
        fn prop_confidence_in_range(text in ".{0,200}") {
            prop_assert!(extract_confidence(&text) <= 100);
        }

        #[test]
        fn prop_explicit_percent_recovered(n in 0u8..=100) {
            let text = format!("Analysis done. Confidence: {n}%");
            prop_assert_eq!(explicit_confidence(&text), Some(n));
        }
    }
}
