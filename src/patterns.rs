//! The pattern table: every publisher-specific rule the cleaner knows about.
//!
//! Boilerplate conventions differ per aggregator (JSTOR, IOP, HAL,
//! Elsevier-style journals) and new ones turn up with every corpus. The rules
//! therefore live here as plain data rather than as branches in the
//! pipeline. Extending the cleaner means adding an entry, either in
//! [`PatternTable::default`] or in a TOML overlay loaded at runtime:
//!
//! ```toml
//! # patterns.toml: appended to the built-in table
//! skip_page_markers = ["Downloaded via"]
//!
//! [[line_rules]]
//! name = "hydrology-header"
//! pattern = '^Journal of Hydrology \d+ \(\d{4}\) \d+\s*$'
//! ```
//!
//! Rule order is significant and preserved: a block rule's anchor can
//! shield text that a later rule then removes.

use crate::error::ProseError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A multi-line removal rule.
///
/// Removes from a match of `start` up to, but not including, the first
/// following match of `anchor`. Compiled case-insensitive with `.` matching
/// newlines, so the anchor is what bounds the deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRule {
    pub name: String,
    pub start: String,
    pub anchor: String,
}

/// A single-line removal rule, compiled in multi-line mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRule {
    pub name: String,
    pub pattern: String,
}

/// Ordered, read-only configuration for the cleaning pipeline.
///
/// Field order matters for TOML output: plain arrays must precede arrays of
/// tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTable {
    /// Phrases that mark a whole page as a cover/citation page.
    #[serde(default)]
    pub skip_page_markers: Vec<String>,
    /// First words that make a short line a section heading.
    #[serde(default)]
    pub heading_words: Vec<String>,
    /// Trailing words that mean a line continues on the next one.
    #[serde(default)]
    pub continuation_words: Vec<String>,
    #[serde(default)]
    pub block_rules: Vec<BlockRule>,
    #[serde(default)]
    pub line_rules: Vec<LineRule>,
}

/// On-disk pattern overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFile {
    /// Replace the built-in table instead of appending to it.
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(flatten)]
    pub table: PatternTable,
}

impl Default for PatternFile {
    fn default() -> Self {
        Self {
            replace_defaults: false,
            table: PatternTable::empty(),
        }
    }
}

// ── Built-in rules ───────────────────────────────────────────────────────────

const SKIP_PAGE_MARKERS: &[&str] = &[
    "You may also like",
    "To cite this article:",
    "View the article online for updates",
    "This content was downloaded from IP address",
];

const HEADING_WORDS: &[&str] = &[
    "abstract",
    "introduction",
    "methods",
    "results",
    "discussion",
    "conclusion",
    "references",
    "acknowledgment",
    "keywords",
    "summary",
    "background",
];

const CONTINUATION_WORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "of", "in", "to", "for", "with", "by", "from", "that", "which",
    "as", "at", "on", "is", "are", "was", "were", "et", "al",
];

/// `(name, start, anchor)`
const BLOCK_RULES: &[(&str, &str, &str)] = &[
    (
        "hal-header",
        r"HAL Id:",
        r"From sedimentary|Abstract|Introduction|\n\n[A-Z][a-z]",
    ),
    (
        "jstor-source",
        r"Source:.*?Stable URL:",
        r"ABSTRACT|Abstract|Introduction",
    ),
    (
        "jstor-service-notice",
        r"JSTOR is a not-for-profit service",
        r"ABSTRACT|Abstract|[A-Z]{2,}",
    ),
    ("jstor-archive-terms", r"Your use of the JSTOR archive", r"\n\n"),
    ("jstor-download-footer", r"This content downloaded from", r"\n\n|\n[A-Z]"),
];

/// `(name, pattern)`
const LINE_RULES: &[(&str, &str)] = &[
    ("iop-download-footer", r"This content was downloaded from IP address.*"),
    ("jstor-download-footer", r"This content downloaded from.*$"),
    ("jstor-terms-footer", r"All use subject to https://about\.jstor\.org/terms\s*$"),
    ("open-access", r"^OPEN ACCESS\s*$"),
    ("received", r"^RECEIVED\s*$"),
    ("revised", r"^REVISED\s*$"),
    ("accepted", r"^ACCEPTED FOR PUBLICATION\s*$"),
    ("published", r"^PUBLISHED\s*$"),
    ("standalone-date", r"^\d{1,2}\s+\w+\s+\d{4}\s*$"),
    ("cc-original-content", r"^Original content from\s*$"),
    ("cc-may-be-used", r"^this work may be used\s*$"),
    ("cc-terms-of", r"^under the terms of the\s*$"),
    ("cc-creative-commons", r"^Creative Commons\s*$"),
    ("cc-attribution", r"^Attribution \d\.\d licence\.?\s*$"),
    ("cc-further-distribution", r"^Any further distribution\s*$"),
    ("cc-work-must", r"^of this work must\s*$"),
    ("cc-maintain", r"^maintain attribution to\s*$"),
    ("cc-author-title", r"^the author\(s\) and the title\s*$"),
    ("cc-work-journal", r"^of the work,? journal\s*$"),
    ("cc-citation-doi", r"^citation and DOI\.\s*$"),
    ("doi-url", r"^https?://doi\.org/.*$"),
    ("standalone-url", r"^https?://\S+\s*$"),
    ("website-domain", r"^www\.[a-z\-]+\.(org|com|edu)\s*$"),
    ("erl-running-header", r"^Environ\. Res\. Lett\..*$"),
    ("copyright-footer", r"©\s*\d{4}\s+The Author\(s\)\..*$"),
    ("et-al-running-header", r"^[A-Z]\s+[A-Z][a-z]+\s+et\s+al\s*$"),
    ("iop-publisher", r"^IOP Publishing\s*$"),
    ("spaced-article-info", r"^a\s+r\s+t\s+i\s+c\s+l\s+e\s+i\s+n\s+f\s+o\s*$"),
    ("spaced-summary", r"^s\s+u\s+m\s+m\s+a\s+r\s+y\s*$"),
    ("article-history", r"^Article history:\s*$"),
    ("received-revised-accepted", r"^Received.*revised.*Accepted.*$"),
    ("available-online", r"^Available online.*$"),
    ("handled-by", r"^This manuscript was handled by.*$"),
    ("keywords-label", r"^Keywords:\s*$"),
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            skip_page_markers: owned(SKIP_PAGE_MARKERS),
            heading_words: owned(HEADING_WORDS),
            continuation_words: owned(CONTINUATION_WORDS),
            block_rules: BLOCK_RULES
                .iter()
                .map(|(name, start, anchor)| BlockRule {
                    name: name.to_string(),
                    start: start.to_string(),
                    anchor: anchor.to_string(),
                })
                .collect(),
            line_rules: LINE_RULES
                .iter()
                .map(|(name, pattern)| LineRule {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect(),
        }
    }
}

impl PatternTable {
    /// A table with no rules at all. Cleaning with it only fixes ligatures,
    /// normalises whitespace and rejoins lines.
    pub fn empty() -> Self {
        Self {
            skip_page_markers: Vec::new(),
            heading_words: Vec::new(),
            continuation_words: Vec::new(),
            block_rules: Vec::new(),
            line_rules: Vec::new(),
        }
    }

    /// Append every list of `other` after this table's entries.
    pub fn extend(&mut self, other: PatternTable) {
        self.skip_page_markers.extend(other.skip_page_markers);
        self.heading_words.extend(other.heading_words);
        self.continuation_words.extend(other.continuation_words);
        self.block_rules.extend(other.block_rules);
        self.line_rules.extend(other.line_rules);
    }

    /// Parse a [`PatternFile`] and apply it to the built-in table.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        let file: PatternFile = toml::from_str(source)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: PatternFile) -> Self {
        if file.replace_defaults {
            file.table
        } else {
            let mut table = Self::default();
            table.extend(file.table);
            table
        }
    }

    /// Load a TOML pattern file from disk. See [`PatternTable::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProseError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ProseError::PatternFile {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_toml_str(&source).map_err(|e| ProseError::PatternFile {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Serialise as a complete pattern file (`replace_defaults = true`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&PatternFile {
            replace_defaults: true,
            table: self.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_keeps_declaration_order() {
        let table = PatternTable::default();
        assert_eq!(table.block_rules[0].name, "hal-header");
        assert_eq!(table.block_rules.last().unwrap().name, "jstor-download-footer");
        assert_eq!(table.line_rules[0].name, "iop-download-footer");
        assert_eq!(table.line_rules.last().unwrap().name, "keywords-label");
        assert_eq!(table.heading_words.len(), 11);
        assert_eq!(table.continuation_words.len(), 23);
    }

    #[test]
    fn overlay_appends_by_default() {
        let table = PatternTable::from_toml_str(
            r#"
skip_page_markers = ["Downloaded via"]

[[line_rules]]
name = "hydrology-header"
pattern = '^Journal of Hydrology \d+ \(\d{4}\) \d+\s*$'
"#,
        )
        .unwrap();

        let defaults = PatternTable::default();
        assert_eq!(table.skip_page_markers.len(), defaults.skip_page_markers.len() + 1);
        assert_eq!(table.skip_page_markers.last().unwrap(), "Downloaded via");
        assert_eq!(table.line_rules.last().unwrap().name, "hydrology-header");
        assert_eq!(table.block_rules, defaults.block_rules);
        assert_eq!(table.heading_words, defaults.heading_words);
    }

    #[test]
    fn overlay_can_replace_defaults() {
        let table = PatternTable::from_toml_str(
            r#"
replace_defaults = true
heading_words = ["methodology"]
"#,
        )
        .unwrap();
        assert_eq!(table.heading_words, vec!["methodology".to_string()]);
        assert!(table.line_rules.is_empty());
        assert!(table.skip_page_markers.is_empty());
    }

    #[test]
    fn dumped_table_reloads_identically() {
        let table = PatternTable::default();
        let dumped = table.to_toml().unwrap();
        assert!(dumped.contains("replace_defaults = true"));
        assert_eq!(PatternTable::from_toml_str(&dumped).unwrap(), table);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PatternTable::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ProseError::PatternFile { .. }));
    }

    #[test]
    fn load_reports_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "line_rules = 3").unwrap();
        let err = PatternTable::load(&path).unwrap_err();
        assert!(matches!(err, ProseError::PatternFile { .. }));
    }
}
