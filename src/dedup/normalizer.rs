//! Canonical comparison keys for deduplication

use std::fmt;

use unicode_normalization::UnicodeNormalization;

/// Canonical form of a text, used only as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Build the key for `text`
    pub fn of(text: &str) -> Self {
        Self(normalize_text(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a text for deduplication.
///
/// Applies NFKC, lowercases, collapses every run of whitespace into a single
/// space and trims both ends. Characters are never reordered.
pub fn normalize_text(text: &str) -> String {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    folded
        .split(is_separator)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unicode whitespace plus the ASCII information separators (U+001C..U+001F)
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Like [`normalize_text`], mapping an absent text to the empty key.
pub fn normalize_optional(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_folding() {
        assert_eq!(normalize_text("Hello world"), "hello world");
        assert_eq!(normalize_text("hello   WORLD"), "hello world");
        assert_eq!(normalize_text("  \t hello\n\nworld \r\n"), "hello world");
    }

    #[test]
    fn test_information_separators_fold_to_space() {
        assert_eq!(normalize_text("a\u{1f}b"), "a b");
        assert_eq!(normalize_text("\u{1c}A\u{1d}\u{1e} B\u{1f}"), "a b");
        assert_eq!(NormalizedKey::of("a\u{1f}b"), NormalizedKey::of("A   b"));
    }

    #[test]
    fn test_compatibility_forms() {
        // Fullwidth letters and the "fi" ligature fold under NFKC
        assert_eq!(normalize_text("ＨＥＬＬＯ"), "hello");
        assert_eq!(normalize_text("\u{FB01}le"), "file");
        // Non-breaking space is whitespace after NFKC
        assert_eq!(normalize_text("a\u{00A0}\u{00A0}b"), "a b");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Hello world",
            "  MIXED\tcase  text ",
            "ＦＵＬＬ　ＷＩＤＴＨ",
            "Straße",
            "İstanbul",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(normalize_optional(None), "");
        assert_eq!(normalize_optional(Some("  ")), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_key_equality() {
        assert_eq!(NormalizedKey::of("Goodbye"), NormalizedKey::of(" goodbye "));
        assert_ne!(NormalizedKey::of("Goodbye"), NormalizedKey::of("Good bye"));
        assert_eq!(NormalizedKey::of("A  B").as_str(), "a b");
    }
}
