//! The compiled cleaning pipeline.
//!
//! [`TextCleaner`] owns a [`PatternTable`] together with everything compiled
//! from it, and runs the stages in order:
//!
//! ```text
//! pages ─▶ line endings + ligatures ─▶ page filter ─▶ join("\n")
//!       ─▶ boilerplate ─▶ whitespace ─▶ rejoin ─▶ whitespace ─▶ text
//! ```
//!
//! Every operation is total: any UTF-8 input produces a UTF-8 output, and an
//! empty document (or one whose pages were all filtered) produces `""`.

use crate::error::ProseError;
use crate::output::PageDisposition;
use crate::patterns::PatternTable;
use crate::pipeline::boilerplate::BoilerplateStripper;
use crate::pipeline::classify::{LineClass, LineClassifier, LineEnding};
use crate::pipeline::ligature::fix_ligatures;
use crate::pipeline::page_filter::PageFilter;
use crate::pipeline::rejoin::rejoin_broken_lines;
use crate::pipeline::whitespace::{normalise_line_endings, normalize_whitespace, stabilize_line_breaks};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

static STANDARD: Lazy<Arc<TextCleaner>> = Lazy::new(|| {
    Arc::new(TextCleaner::new(PatternTable::default()).expect("built-in pattern table must compile"))
});

/// Clean a document's pages with the built-in pattern table.
///
/// Pages are given in reading order. Cover pages and blank pages are dropped,
/// boilerplate is removed and broken lines are rejoined into paragraphs.
///
/// ```rust
/// let text = pdfprose::clean_raw_text(&[
///     "2. Methods\nWe used a kriging approach to\ninterpolate the shoreline positions.",
/// ]);
/// assert_eq!(
///     text,
///     "2. Methods\nWe used a kriging approach to interpolate the shoreline positions."
/// );
/// ```
pub fn clean_raw_text<S: AsRef<str>>(pages: &[S]) -> String {
    TextCleaner::standard().clean_pages(pages)
}

/// Classify one line with the built-in heading and continuation vocabularies.
pub fn classify_line(line: &str) -> LineClass {
    TextCleaner::standard().classify_line(line)
}

/// Cleaned text plus what happened to each input page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPages {
    pub text: String,
    /// One entry per input page, in input order.
    pub dispositions: Vec<PageDisposition>,
}

/// A pattern table compiled into a ready-to-run pipeline.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    table: PatternTable,
    filter: PageFilter,
    stripper: BoilerplateStripper,
    classifier: LineClassifier,
}

impl TextCleaner {
    /// Compile `table`. Fails with [`ProseError::InvalidPattern`] naming the
    /// first rule that is not a valid regular expression.
    pub fn new(table: PatternTable) -> Result<Self, ProseError> {
        let stripper = BoilerplateStripper::new(&table.block_rules, &table.line_rules)?;
        let filter = PageFilter::new(&table.skip_page_markers);
        let classifier = LineClassifier::new(&table.heading_words, &table.continuation_words);
        debug!(
            "Compiled pattern table: {} markers, {} block rules, {} line rules",
            filter.len(),
            stripper.block_rule_count(),
            stripper.line_rule_count()
        );
        Ok(Self {
            table,
            filter,
            stripper,
            classifier,
        })
    }

    /// The process-wide cleaner for the built-in table, compiled on first use.
    pub fn standard() -> &'static TextCleaner {
        &STANDARD
    }

    /// [`TextCleaner::standard`] as a shareable handle.
    pub fn shared() -> Arc<TextCleaner> {
        Arc::clone(&STANDARD)
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    // ── Whole-document operations ────────────────────────────────────────────

    /// Full pipeline with the page filter enabled.
    pub fn clean_pages<S: AsRef<str>>(&self, pages: &[S]) -> String {
        self.clean_pages_with_report(pages, true).text
    }

    /// Full pipeline, reporting the fate of every page.
    ///
    /// With `skip_cover_pages == false` the page filter is bypassed and only
    /// blank pages are dropped.
    pub fn clean_pages_with_report<S: AsRef<str>>(
        &self,
        pages: &[S],
        skip_cover_pages: bool,
    ) -> CleanedPages {
        let mut kept: Vec<String> = Vec::with_capacity(pages.len());
        let mut dispositions = Vec::with_capacity(pages.len());

        for (idx, page) in pages.iter().enumerate() {
            let prepared = prepare(page.as_ref());

            if skip_cover_pages {
                if let Some(marker) = self.filter.matched_marker(&prepared) {
                    debug!("Page {}: cover page ('{}')", idx + 1, marker);
                    dispositions.push(PageDisposition::CoverPage {
                        marker: marker.to_string(),
                    });
                    continue;
                }
            }

            if prepared.trim().is_empty() {
                dispositions.push(PageDisposition::Blank);
                continue;
            }

            dispositions.push(PageDisposition::Kept);
            kept.push(prepared);
        }

        let text = self.clean_prepared(&kept.join("\n"));
        CleanedPages { text, dispositions }
    }

    /// Everything after the page filter, on text that is already one buffer.
    pub fn clean_text(&self, text: &str) -> String {
        self.clean_prepared(&prepare(text))
    }

    /// Minimal processing: ligatures and whitespace only.
    ///
    /// No page filter, no boilerplate stripping and no rejoining. Blank pages
    /// are still dropped.
    pub fn raw_pages<S: AsRef<str>>(&self, pages: &[S]) -> CleanedPages {
        let mut kept: Vec<String> = Vec::with_capacity(pages.len());
        let mut dispositions = Vec::with_capacity(pages.len());
        for page in pages {
            let prepared = prepare(page.as_ref());
            if prepared.trim().is_empty() {
                dispositions.push(PageDisposition::Blank);
            } else {
                dispositions.push(PageDisposition::Kept);
                kept.push(prepared);
            }
        }
        CleanedPages {
            text: normalize_whitespace(&kept.join("\n")),
            dispositions,
        }
    }

    fn clean_prepared(&self, text: &str) -> String {
        let s = self.stripper.strip(text);
        let s = stabilize_line_breaks(&s);
        let s = rejoin_broken_lines(&s, &self.classifier);
        normalize_whitespace(&s)
    }

    // ── Single stages ────────────────────────────────────────────────────────

    pub fn is_skip_page(&self, page: &str) -> bool {
        self.filter.is_skip_page(page)
    }

    pub fn strip_boilerplate(&self, text: &str) -> String {
        self.stripper.strip(text)
    }

    pub fn rejoin_lines(&self, text: &str) -> String {
        rejoin_broken_lines(text, &self.classifier)
    }

    pub fn classify_line(&self, line: &str) -> LineClass {
        self.classifier.classify(line)
    }

    pub fn is_heading(&self, line: &str) -> bool {
        self.classifier.is_heading(line)
    }

    pub fn ends_sentence(&self, line: &str) -> bool {
        self.classifier.ends_sentence(line)
    }

    pub fn line_ending(&self, line: &str) -> LineEnding {
        self.classifier.line_ending(line)
    }
}

/// The character pass: `\n` line endings, ligatures expanded.
fn prepare(page: &str) -> String {
    fix_ligatures(&normalise_line_endings(page))
}
