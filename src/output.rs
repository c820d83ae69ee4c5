//! Output types returned by the extraction API.

use serde::{Deserialize, Serialize};

/// Result of extracting and cleaning one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanOutput {
    /// The cleaned, paragraph-structured text.
    pub text: String,
    /// One report per selected page, in page order.
    pub pages: Vec<PageReport>,
    pub metadata: DocumentMetadata,
    pub stats: ExtractionStats,
}

/// What happened to a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    /// 1-indexed page number in the source PDF.
    pub page_num: usize,
    /// Characters of raw text the decoder produced for this page.
    pub chars: usize,
    pub disposition: PageDisposition,
}

/// Whether a page's text went into the working buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageDisposition {
    Kept,
    /// Dropped by the page filter.
    CoverPage { marker: String },
    /// Dropped because it had no text.
    Blank,
}

/// PDF document-information dictionary plus a few structural facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Counters and timings for one extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the PDF.
    pub total_pages: usize,
    /// Pages matched by the page selection.
    pub selected_pages: usize,
    pub kept_pages: usize,
    pub cover_pages: usize,
    pub blank_pages: usize,
    pub text: TextStats,
    pub total_duration_ms: u64,
    /// Time spent in the PDF decoder.
    pub extract_duration_ms: u64,
    /// Time spent in the cleaning pipeline.
    pub clean_duration_ms: u64,
}

impl ExtractionStats {
    /// Fill the page counters from a list of reports.
    pub fn count_pages(&mut self, pages: &[PageReport]) {
        self.selected_pages = pages.len();
        self.kept_pages = 0;
        self.cover_pages = 0;
        self.blank_pages = 0;
        for page in pages {
            match page.disposition {
                PageDisposition::Kept => self.kept_pages += 1,
                PageDisposition::CoverPage { .. } => self.cover_pages += 1,
                PageDisposition::Blank => self.blank_pages += 1,
            }
        }
    }
}

/// Size of a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// Unicode scalar values.
    pub characters: usize,
    /// Whitespace-separated tokens.
    pub words: usize,
    /// Blank-line separated blocks; 0 for blank text.
    pub paragraphs: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let paragraphs = if text.trim().is_empty() {
            0
        } else {
            text.matches("\n\n").count() + 1
        };
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            paragraphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_stats() {
        let stats = TextStats::of("First para ends.\n\nSecond one here.\nStill second.");
        assert_eq!(stats.words, 8);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.characters, 48);
    }

    #[test]
    fn test_text_stats_blank() {
        assert_eq!(TextStats::of(""), TextStats::default());
        assert_eq!(TextStats::of("  \n ").paragraphs, 0);
    }

    #[test]
    fn test_text_stats_counts_chars_not_bytes() {
        assert_eq!(TextStats::of("±0.5 m").characters, 6);
    }

    #[test]
    fn test_count_pages() {
        let pages = vec![
            PageReport {
                page_num: 1,
                chars: 120,
                disposition: PageDisposition::CoverPage {
                    marker: "You may also like".into(),
                },
            },
            PageReport {
                page_num: 2,
                chars: 3000,
                disposition: PageDisposition::Kept,
            },
            PageReport {
                page_num: 3,
                chars: 0,
                disposition: PageDisposition::Blank,
            },
        ];
        let mut stats = ExtractionStats::default();
        stats.count_pages(&pages);
        assert_eq!(
            (stats.selected_pages, stats.kept_pages, stats.cover_pages, stats.blank_pages),
            (3, 1, 1, 1)
        );
    }

    #[test]
    fn test_disposition_json() {
        let json = serde_json::to_string(&PageDisposition::CoverPage {
            marker: "To cite this article:".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"cover_page","marker":"To cite this article:"}"#);
        assert_eq!(
            serde_json::to_string(&PageDisposition::Kept).unwrap(),
            r#"{"kind":"kept"}"#
        );
    }
}
