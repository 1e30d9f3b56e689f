//! Text normalization for answer comparison.
//!
//! Raw answers are canonicalized before the relevance check and before
//! inclusion in the oracle prompt: lower-cased, punctuation stripped,
//! whitespace collapsed. Normalization is idempotent.

use std::fmt;
use std::str::SplitWhitespace;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Everything that is not a word character or whitespace.
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();

    /// Any run of whitespace, including tabs and newlines.
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A canonicalized answer: lower-cased, punctuation-free, single-spaced,
/// trimmed.
///
/// Construction goes through [`normalize`], so holding a `NormalizedAnswer`
/// is proof the text is already canonical; normalizing it again is the
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAnswer(String);

impl NormalizedAnswer {
    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Words of the answer, in order. After normalization every separator
    /// is a single space.
    pub fn words(&self) -> SplitWhitespace<'_> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for NormalizedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize raw answer text.
///
/// Lower-cases the input, removes every character that is not alphanumeric,
/// underscore, or whitespace, collapses whitespace runs to single spaces,
/// and trims. Empty input normalizes to the empty string; this never fails.
pub fn normalize(text: &str) -> NormalizedAnswer {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    NormalizedAnswer(collapsed.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let n = normalize("The Mitochondria, is the POWERHOUSE of the cell!");
        assert_eq!(n.as_str(), "the mitochondria is the powerhouse of the cell");
    }

    #[test]
    fn test_collapses_whitespace() {
        let n = normalize("  one\t\ttwo \n three  ");
        assert_eq!(n.as_str(), "one two three");
    }

    #[test]
    fn test_preserves_numbers_and_word_boundaries() {
        let n = normalize("Water boils at 100°C (at sea level).");
        assert_eq!(n.as_str(), "water boils at 100c at sea level");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\t ").is_empty());
        assert!(normalize("!?.,;").is_empty());
    }

    #[test]
    fn test_words_iteration() {
        let n = normalize("alpha beta, gamma.");
        let words: Vec<&str> = n.words().collect();
        assert_eq!(words, vec!["alpha", "beta", "gamma"]);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in ".*") {
            let once = normalize(&s);
            let twice = normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalized_text_is_canonical(s in ".*") {
            let n = normalize(&s);
            prop_assert!(!PUNCTUATION.is_match(n.as_str()));
            prop_assert!(!n.as_str().contains("  "));
            prop_assert_eq!(n.as_str().trim(), n.as_str());
        }
    }
}
