//! Line classification: is a line a section heading, and does it end a
//! sentence?
//!
//! Both predicates look at a single line and nothing else. The rejoiner calls
//! them again on every merged line, so they must stay cheap and must not
//! cache anything between calls.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// "2. Methods", "3.1 Study area", "4.2. Results"
static RE_NUMBERED_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.?\d*\.?\s+[A-Z]").unwrap());

/// "(Smith 2021a)", "(Ma et al. 2019)."
static RE_CITATION_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[a-z]?\)\s*\.?\s*$").unwrap());

/// Both predicates for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineClass {
    pub is_heading: bool,
    pub ends_sentence: bool,
}

/// How a line ends, in the order the checks are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    /// Empty line. Counts as a sentence end so that rejoining stops.
    Empty,
    /// `.`, `!` or `?`, possibly followed by whitespace.
    Terminal,
    /// A year and closing parenthesis, e.g. `(Smith 2021a)`.
    Citation,
    /// `:`
    Colon,
    /// A comma, a semicolon, a continuation word or an unclosed `(`.
    Continuation,
    /// None of the above.
    Unterminated,
}

impl LineEnding {
    pub fn ends_sentence(self) -> bool {
        matches!(
            self,
            LineEnding::Empty | LineEnding::Terminal | LineEnding::Citation | LineEnding::Colon
        )
    }
}

/// Heading and sentence-end predicates built from a heading vocabulary and a
/// continuation-word list.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    heading_words: HashSet<String>,
    continuation_words: HashSet<String>,
}

impl LineClassifier {
    pub fn new<S: AsRef<str>>(heading_words: &[S], continuation_words: &[S]) -> Self {
        let normalise = |words: &[S]| {
            words
                .iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect::<HashSet<_>>()
        };
        Self {
            heading_words: normalise(heading_words),
            continuation_words: normalise(continuation_words),
        }
    }

    pub fn classify(&self, line: &str) -> LineClass {
        LineClass {
            is_heading: self.is_heading(line),
            ends_sentence: self.ends_sentence(line),
        }
    }

    /// True if any heading rule matches:
    ///
    /// 1. numbered section ("2.1 Methods")
    /// 2. all upper-case and shorter than 60 characters
    /// 3. first word in the heading vocabulary, line shorter than 40 characters
    /// 4. shorter than 30 characters, capitalised, no trailing comma, at most
    ///    four words
    pub fn is_heading(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }

        if RE_NUMBERED_SECTION.is_match(line) {
            return true;
        }

        if is_upper(line) && shorter_than(line, 60) {
            return true;
        }

        if let Some(first) = line.split_whitespace().next() {
            let first = first.to_lowercase();
            let first = first.trim_end_matches(['.', ':']);
            if self.heading_words.contains(first) && shorter_than(line, 40) {
                return true;
            }
        }

        shorter_than(line, 30)
            && line.chars().next().is_some_and(char::is_uppercase)
            && !line.ends_with(',')
            && line.split_whitespace().count() <= 4
    }

    pub fn ends_sentence(&self, line: &str) -> bool {
        self.line_ending(line).ends_sentence()
    }

    /// Why a line does or does not end a sentence.
    ///
    /// Anything that is not explicitly terminated counts as unfinished,
    /// short lines included: merging is the default for prose.
    pub fn line_ending(&self, line: &str) -> LineEnding {
        if line.is_empty() {
            return LineEnding::Empty;
        }
        if line.trim_end().ends_with(['.', '!', '?']) {
            return LineEnding::Terminal;
        }
        if RE_CITATION_END.is_match(line) {
            return LineEnding::Citation;
        }
        if line.ends_with(':') {
            return LineEnding::Colon;
        }
        if self.ends_with_continuation(line) {
            return LineEnding::Continuation;
        }
        LineEnding::Unterminated
    }

    fn ends_with_continuation(&self, line: &str) -> bool {
        if line.ends_with([',', ';']) {
            return true;
        }
        if has_unclosed_paren(line) {
            return true;
        }
        // Trailing run of word characters; empty when the line ends in
        // punctuation or whitespace.
        let last_word = line
            .rsplit(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or("");
        !last_word.is_empty() && self.continuation_words.contains(&last_word.to_lowercase())
    }
}

/// At least one upper-case letter and no lower-case ones.
fn is_upper(line: &str) -> bool {
    let mut any_upper = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        any_upper |= c.is_uppercase();
    }
    any_upper
}

/// Character (not byte) length check that stops counting early.
fn shorter_than(line: &str, limit: usize) -> bool {
    line.chars().take(limit).count() < limit
}

fn has_unclosed_paren(line: &str) -> bool {
    match line.rfind('(') {
        Some(open) => !line[open..].contains(')'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternTable;

    fn classifier() -> LineClassifier {
        let table = PatternTable::default();
        LineClassifier::new(&table.heading_words, &table.continuation_words)
    }

    // ── is_heading ───────────────────────────────────────────────────────────

    #[test]
    fn test_numbered_sections() {
        let c = classifier();
        assert!(c.is_heading("2. Methods"));
        assert!(c.is_heading("2.1 Study area and data sources used in this long heading"));
        assert!(c.is_heading("4.2. Results"));
        assert!(!c.is_heading("12 samples were collected at each of the sites."));
    }

    #[test]
    fn test_all_caps() {
        let c = classifier();
        assert!(c.is_heading("RESULTS AND DISCUSSION"));
        assert!(c.is_heading("LETTER"));
        assert!(!c.is_heading("1998 2005 2012"));
        let long = "A VERY LONG ALL CAPS LINE THAT GOES ON WELL PAST SIXTY CHARACTERS";
        assert!(long.chars().count() >= 60);
        assert!(!c.is_heading(long));
    }

    #[test]
    fn test_heading_vocabulary() {
        let c = classifier();
        assert!(c.is_heading("Results of the field campaign in 2019"));
        assert!(c.is_heading("Abstract: shoreline change and storms"));
        assert!(c.is_heading("acknowledgment."));
        assert!(!c.is_heading("results of the field campaign were compared with models"));
    }

    #[test]
    fn test_short_capitalised_lines() {
        let c = classifier();
        assert!(c.is_heading("Study area"));
        assert!(c.is_heading("Shoreline change rates"));
        assert!(!c.is_heading("Galveston Island,"));
        assert!(!c.is_heading("Five words are too many"));
        assert!(!c.is_heading("short lower-case line"));
    }

    #[test]
    fn test_empty_is_not_heading() {
        assert!(!classifier().is_heading(""));
    }

    // ── ends_sentence ────────────────────────────────────────────────────────

    #[test]
    fn test_terminal_punctuation() {
        let c = classifier();
        assert_eq!(c.line_ending("The dunes migrated."), LineEnding::Terminal);
        assert_eq!(c.line_ending("Did they migrate?  "), LineEnding::Terminal);
        assert_eq!(c.line_ending("(Smith et al., 2019)."), LineEnding::Terminal);
        assert!(c.ends_sentence("Remarkable!"));
    }

    #[test]
    fn test_citation_ending() {
        let c = classifier();
        assert_eq!(
            c.line_ending("as reported by earlier surveys (Smith 2021a)"),
            LineEnding::Citation
        );
        assert_eq!(c.line_ending("(Morton 2004) "), LineEnding::Citation);
        assert!(c.ends_sentence("(Morton 2004)"));
    }

    #[test]
    fn test_colon() {
        let c = classifier();
        assert_eq!(c.line_ending("three sites were sampled:"), LineEnding::Colon);
        assert!(c.ends_sentence("three sites were sampled:"));
    }

    #[test]
    fn test_continuations() {
        let c = classifier();
        for line in [
            "sediment supply and",
            "along the upper coast,",
            "rates were low;",
            "storm events AND",
            "as shown by Smith et",
            "the mean rate (m",
        ] {
            assert_eq!(c.line_ending(line), LineEnding::Continuation, "{line:?}");
            assert!(!c.ends_sentence(line), "{line:?}");
        }
    }

    #[test]
    fn test_continuation_word_needs_word_boundary() {
        let c = classifier();
        assert_eq!(c.line_ending("the dunes near the island brand"), LineEnding::Unterminated);
        assert_eq!(c.line_ending("measured values (m/yr)"), LineEnding::Unterminated);
    }

    #[test]
    fn test_unpunctuated_lines_never_end_sentences() {
        // Short lines get no special treatment: anything not explicitly
        // terminated is treated as continuing, whatever its length.
        let c = classifier();
        assert!(!c.ends_sentence("Short unpunctuated"));
        assert!(!c.ends_sentence(
            "a much longer line of running prose that simply stops without punctuation"
        ));
        assert_eq!(c.line_ending("Short unpunctuated"), LineEnding::Unterminated);
    }

    #[test]
    fn test_empty_ends_sentence() {
        let c = classifier();
        assert_eq!(c.line_ending(""), LineEnding::Empty);
        assert!(c.ends_sentence(""));
    }

    #[test]
    fn test_classify_combines_predicates() {
        let c = classifier();
        assert_eq!(
            c.classify("2. Methods"),
            LineClass {
                is_heading: true,
                ends_sentence: false
            }
        );
        assert_eq!(
            c.classify("We used a kriging approach."),
            LineClass {
                is_heading: false,
                ends_sentence: true
            }
        );
    }

    #[test]
    fn test_custom_vocabulary() {
        let c = LineClassifier::new(&["Methodology"], &["versus"]);
        assert!(c.is_heading("Methodology of the coastal survey work"));
        assert_eq!(c.line_ending("erosion versus"), LineEnding::Continuation);
        assert_eq!(c.line_ending("erosion and"), LineEnding::Unterminated);
    }
}
