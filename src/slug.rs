//! Title → filename slug.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default maximum slug length, in characters.
pub const DEFAULT_SLUG_LENGTH: usize = 80;

static RE_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Turn a paper title into a lower-case, underscore-separated file stem.
///
/// Punctuation is dropped, whitespace runs become `_`, and the result is cut
/// to `max_len` characters. A title with nothing usable yields `"untitled"`.
///
/// ```rust
/// use pdfprose::slug::{slugify, DEFAULT_SLUG_LENGTH};
///
/// assert_eq!(slugify("Coastal Dunes: A Review!", DEFAULT_SLUG_LENGTH), "coastal_dunes_a_review");
/// ```
pub fn slugify(title: &str, max_len: usize) -> String {
    let s = RE_DISALLOWED.replace_all(title, "");
    let s = RE_WHITESPACE.replace_all(&s, "_");
    let s = RE_UNDERSCORES.replace_all(&s, "_");
    let truncated: String = s.chars().take(max_len).collect();
    let slug = truncated.trim_matches('_').to_lowercase();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
