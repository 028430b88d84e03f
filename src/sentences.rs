//! Sentence splitting
//!
//! Documents are split into sentences before per-sentence embedding. The
//! splitter is a seam so a smarter tokenizer can be dropped in later.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Sentence terminator followed by whitespace or the end of the text
pub const DEFAULT_BOUNDARY: &str = r"[.!?]+(?:\s+|$)";

/// Sentences shorter than this (in characters) are dropped
pub const MIN_SENTENCE_CHARS: usize = 3;

static DEFAULT_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_BOUNDARY).expect("default sentence boundary is a valid pattern")
});

/// Turns a document into an ordered list of sentences
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Splits on a boundary pattern after cleaning the text
#[derive(Debug, Clone)]
pub struct RegexSentenceSplitter {
    boundary: Regex,
    min_chars: usize,
}

impl Default for RegexSentenceSplitter {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY_RE.clone(),
            min_chars: MIN_SENTENCE_CHARS,
        }
    }
}

impl RegexSentenceSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splitter with a custom boundary pattern
    pub fn with_boundary(pattern: &str) -> Result<Self> {
        let boundary = Regex::new(pattern)
            .map_err(|e| Error::Configuration(format!("invalid sentence boundary: {e}")))?;
        Ok(Self {
            boundary,
            min_chars: MIN_SENTENCE_CHARS,
        })
    }

    pub fn min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

impl SentenceSplitter for RegexSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in self.boundary.find_iter(&cleaned) {
            sentences.push(&cleaned[start..boundary.end()]);
            start = boundary.end();
        }
        sentences.push(&cleaned[start..]);

        sentences
            .into_iter()
            .map(str::trim)
            .filter(|s| s.chars().count() >= self.min_chars)
            .map(str::to_string)
            .collect()
    }
}

/// Replace control characters with spaces and collapse whitespace
pub fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let splitter = RegexSentenceSplitter::new();
        assert_eq!(
            splitter.split("First sentence. Second one!  Third?\nLast bit"),
            vec!["First sentence.", "Second one!", "Third?", "Last bit"]
        );
    }

    #[test]
    fn test_short_fragments_dropped() {
        let splitter = RegexSentenceSplitter::new();
        assert_eq!(
            splitter.split("A. B. This stays."),
            vec!["This stays."]
        );
    }

    #[test]
    fn test_decimal_points_do_not_split() {
        let splitter = RegexSentenceSplitter::new();
        assert_eq!(
            splitter.split("Pi is 3.14 roughly. Yes it is."),
            vec!["Pi is 3.14 roughly.", "Yes it is."]
        );
    }

    #[test]
    fn test_control_characters_cleaned() {
        assert_eq!(clean_text("a\u{0}b\t\tc\u{85}d\r\n"), "a b c d");
        let splitter = RegexSentenceSplitter::new();
        assert!(splitter.split(" \u{7f}\n ").is_empty());
    }

    #[test]
    fn test_custom_boundary() {
        let splitter = RegexSentenceSplitter::with_boundary(r";\s*").unwrap().min_chars(1);
        assert_eq!(splitter.split("a; b;c"), vec!["a;", "b;", "c"]);
        assert!(matches!(
            RegexSentenceSplitter::with_boundary("("),
            Err(Error::Configuration(_))
        ));
    }
}
