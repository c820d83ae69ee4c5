//! Boilerplate stripping: publisher and aggregator noise removal.
//!
//! Three passes over the concatenated page text, in this order:
//!
//! 1. **Block rules**: multi-line deletions bounded by an anchor
//!    (repository headers, JSTOR citation blocks and legal notices)
//! 2. **Line rules**: single-line deletions (footers, lifecycle markers,
//!    licence lines, DOI/URL lines, running headers, metadata labels)
//! 3. **Page numbers**: lines that hold nothing but digits
//!
//! Block rules go first because their anchors rely on text that a line rule
//! might otherwise delete. Removal is best-effort: whatever survives is
//! tolerated by the rejoiner.

use crate::error::ProseError;
use crate::patterns::{BlockRule, LineRule};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const ANCHOR_GROUP: &str = "block_anchor";

static RE_PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d+\s*$").unwrap());

#[derive(Debug, Clone)]
struct CompiledBlock {
    name: String,
    re: Regex,
}

#[derive(Debug, Clone)]
struct CompiledLine {
    name: String,
    re: Regex,
}

/// The compiled block and line rules of a pattern table.
#[derive(Debug, Clone)]
pub struct BoilerplateStripper {
    blocks: Vec<CompiledBlock>,
    lines: Vec<CompiledLine>,
}

impl BoilerplateStripper {
    /// Compile every rule. Fails on the first rule that is not a valid regex.
    pub fn new(blocks: &[BlockRule], lines: &[LineRule]) -> Result<Self, ProseError> {
        let blocks = blocks
            .iter()
            .map(|rule| {
                // The regex crate has no look-ahead: the anchor is captured
                // instead, and `remove_blocks` resumes the search at it.
                let source = format!(
                    "(?ims)(?:{}).*?(?P<{ANCHOR_GROUP}>{})",
                    rule.start, rule.anchor
                );
                Regex::new(&source)
                    .map(|re| CompiledBlock {
                        name: rule.name.clone(),
                        re,
                    })
                    .map_err(|source| ProseError::InvalidPattern {
                        rule: rule.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lines = lines
            .iter()
            .map(|rule| {
                Regex::new(&format!("(?m){}", rule.pattern))
                    .map(|re| CompiledLine {
                        name: rule.name.clone(),
                        re,
                    })
                    .map_err(|source| ProseError::InvalidPattern {
                        rule: rule.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { blocks, lines })
    }

    /// Run all three passes.
    pub fn strip(&self, input: &str) -> String {
        let mut text = input.to_string();

        for block in &self.blocks {
            let (stripped, hits) = remove_blocks(&block.re, &text);
            if hits > 0 {
                debug!("Block rule '{}' removed {} block(s)", block.name, hits);
                text = stripped;
            }
        }

        for line in &self.lines {
            if line.re.is_match(&text) {
                let hits = line.re.find_iter(&text).count();
                debug!("Line rule '{}' removed {} match(es)", line.name, hits);
                text = line.re.replace_all(&text, "").into_owned();
            }
        }

        RE_PAGE_NUMBER.replace_all(&text, "").into_owned()
    }

    pub fn block_rule_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn line_rule_count(&self) -> usize {
        self.lines.len()
    }
}

/// Delete every `start … anchor` span, keeping the anchor.
///
/// Each search resumes at the previous anchor, so the anchor text is
/// eligible to start the next match.
fn remove_blocks(re: &Regex, text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut hits = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let anchor = caps
            .name(ANCHOR_GROUP)
            .map_or(whole.end(), |m| m.start());

        out.push_str(&text[pos..whole.start()]);

        if anchor > whole.start() {
            hits += 1;
            pos = anchor;
        } else {
            // Nothing to delete here; step over one character.
            match text[whole.start()..].chars().next() {
                Some(c) => {
                    out.push(c);
                    pos = whole.start() + c.len_utf8();
                }
                None => {
                    pos = text.len();
                    break;
                }
            }
        }
    }

    out.push_str(&text[pos.min(text.len())..]);
    (out, hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternTable;

    fn stripper() -> BoilerplateStripper {
        let table = PatternTable::default();
        BoilerplateStripper::new(&table.block_rules, &table.line_rules).unwrap()
    }

    #[test]
    fn test_default_table_compiles() {
        let s = stripper();
        assert_eq!(s.block_rule_count(), 5);
        assert_eq!(s.line_rule_count(), PatternTable::default().line_rules.len());
    }

    #[test]
    fn test_hal_header_stops_before_paragraph() {
        let input = "HAL Id: hal-01234567\nhttps://hal.science/hal-01234567\n\
                     Submitted on 3 Mar 2021\n\nAbstract\nWe study dunes.";
        assert_eq!(stripper().strip(input), "\n\nAbstract\nWe study dunes.");
    }

    #[test]
    fn test_jstor_source_block_stops_at_abstract() {
        let input = "Coastal Dunes\nAuthor(s): A. Smith\n\
                     Source: Journal of Coastal Research, Vol. 12, No. 3 (1996), pp. 1-10\n\
                     Published by: Coastal Education & Research Foundation\n\
                     Stable URL: https://www.jstor.org/stable/4298\nABSTRACT\nDunes migrate.";
        assert_eq!(
            stripper().strip(input),
            "Coastal Dunes\nAuthor(s): A. Smith\nABSTRACT\nDunes migrate."
        );
    }

    #[test]
    fn test_jstor_footer_inside_sentence() {
        let input = "dunes migrate landward during storm\n\
                     This content downloaded from 128.83.63.20 on Mon, 01 Jan 2018 12:00:00 UTC\n\
                     All use subject to https://about.jstor.org/terms\n\
                     events each winter.";
        assert_eq!(
            stripper().strip(input),
            "dunes migrate landward during storm\n\n\nevents each winter."
        );
    }

    #[test]
    fn test_creative_commons_lines() {
        let input = "Original content from\nthis work may be used\nunder the terms of the\n\
                     Creative Commons\nAttribution 4.0 licence.\nAny further distribution\n\
                     of this work must\nmaintain attribution to\nthe author(s) and the title\n\
                     of the work, journal\ncitation and DOI.\nThe shoreline moved landward.";
        let out = stripper().strip(input);
        assert_eq!(out.trim(), "The shoreline moved landward.");
        assert!(!out.contains("Creative Commons"));
    }

    #[test]
    fn test_line_markers_and_page_numbers() {
        let input = "OPEN ACCESS\nRECEIVED\n3 March 2021\nREVISED\nIOP Publishing\n\
                     https://doi.org/10.1088/1748-9326/abc123\nwww.cerf-jcr.org\n12\n\
                     Sea level rise drives erosion.";
        assert_eq!(stripper().strip(input).trim(), "Sea level rise drives erosion.");
    }

    #[test]
    fn test_running_headers_and_copyright() {
        let input = "Environ. Res. Lett. 16 (2021) 034021\nY Ma et al\n\
                     © 2021 The Author(s). Published by IOP Publishing Ltd\nBody text.";
        let out = stripper().strip(input);
        assert_eq!(out.trim(), "Body text.");
        assert!(!out.contains("et al"));
    }

    #[test]
    fn test_numbers_inside_prose_survive() {
        let input = "Rates exceeded 2 m per year\nin 1998 and 2005.";
        assert_eq!(stripper().strip(input), input);
    }

    #[test]
    fn test_strip_twice_is_noop() {
        let s = stripper();
        let input = "HAL Id: hal-01234567\nSubmitted on 3 Mar 2021\n\nAbstract\n\
                     OPEN ACCESS\n4\nWe study dunes.\nThis content downloaded from 1.2.3.4\n\
                     Next page text.";
        let once = s.strip(input);
        assert_eq!(s.strip(&once), once);
    }

    #[test]
    fn test_anchor_is_kept_and_can_restart_match() {
        let re = Regex::new(r"(?ims)(?:x).*?(?P<block_anchor>x)").unwrap();
        // "x1x2x": the second x anchors the first span and starts the next.
        let (out, hits) = remove_blocks(&re, "x1x2x");
        assert_eq!(out, "x");
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_empty_span_makes_progress() {
        let re = Regex::new(r"(?ims)(?:).*?(?P<block_anchor>a)").unwrap();
        let (out, hits) = remove_blocks(&re, "aaa");
        assert_eq!(out, "aaa");
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_invalid_rule_is_named() {
        let err = BoilerplateStripper::new(
            &[],
            &[LineRule {
                name: "broken-footer".into(),
                pattern: "(unclosed".into(),
            }],
        )
        .unwrap_err();
        match err {
            ProseError::InvalidPattern { rule, .. } => assert_eq!(rule, "broken-footer"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
