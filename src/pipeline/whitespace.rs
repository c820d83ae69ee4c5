//! Whitespace normalisation.
//!
//! Runs twice in the full pipeline: [`stabilize_line_breaks`] before
//! rejoining so that line boundaries are stable, and [`normalize_whitespace`]
//! after to tidy anything the merge left behind.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every whitespace rule, in order:
///
/// 1. Collapse runs of spaces and tabs to a single space
/// 2. Trim every line
/// 3. Collapse 3+ consecutive newlines to exactly two (one blank line)
/// 4. Trim the whole document
///
/// Expects `\n` line endings; see [`normalise_line_endings`].
pub fn normalize_whitespace(input: &str) -> String {
    let s = collapse_horizontal(input);
    let s = trim_lines(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

/// The pass that runs before rejoining:
///
/// 1. Collapse runs of spaces and tabs to a single space
/// 2. Collapse 3+ consecutive newlines to exactly two
/// 3. Trim every line
/// 4. Trim the whole document
///
/// Blank runs are collapsed before lines are trimmed. A whitespace-only line
/// next to an empty one therefore still reads as two blank lines, and the
/// rejoiner only bridges a single blank line.
pub fn stabilize_line_breaks(input: &str) -> String {
    let s = collapse_horizontal(input);
    let s = collapse_blank_lines(&s);
    let s = trim_lines(&s);
    s.trim().to_string()
}

// ── Line endings ─────────────────────────────────────────────────────────────

/// CRLF and lone CR become LF.
pub fn normalise_line_endings(input: &str) -> String {
    if !input.contains('\r') {
        return input.to_string();
    }
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 1: Collapse horizontal whitespace ───────────────────────────────────

static RE_HORIZONTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

fn collapse_horizontal(input: &str) -> String {
    RE_HORIZONTAL.replace_all(input, " ").into_owned()
}

// ── Rule 2: Trim every line ──────────────────────────────────────────────────

// `split` rather than `lines`: a trailing '\n' must survive as an empty line.
fn trim_lines(input: &str) -> String {
    input
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}
