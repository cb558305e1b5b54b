//! Heading detection for documents without outline metadata.

use regex::Regex;

/// Longest line, in characters, still accepted as a heading.
pub const MAX_HEADING_CHARS: usize = 120;

/// Decides whether a single line of page text looks like a section title.
pub trait HeadingClassifier {
    /// Return `true` when `line` should open a new section.
    fn is_heading(&self, line: &str) -> bool;
}

/// Pattern-based classifier.
///
/// A heading is an optional `N.` number, then a capital letter, then only letters, digits,
/// spaces, commas, colons, ampersands and hyphens, at most [`MAX_HEADING_CHARS`] long after
/// trimming. Short declarative lines can match and headings wrapped over two lines cannot; this
/// is a known limitation of the pattern.
#[derive(Debug, Clone)]
pub struct PatternHeadingClassifier {
    pattern: Regex,
}

impl PatternHeadingClassifier {
    /// Build the classifier.
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"^(?:[0-9]+\.[ \t]*)?[A-Z][A-Za-z0-9 ,:&-]*$")
                .expect("heading pattern is valid"),
        }
    }
}

impl Default for PatternHeadingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingClassifier for PatternHeadingClassifier {
    fn is_heading(&self, line: &str) -> bool {
        let line = line.trim();
        line.chars().count() <= MAX_HEADING_CHARS && self.pattern.is_match(line)
    }
}
