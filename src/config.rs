//! Configuration types for document extraction and cleaning.
//!
//! Everything the document-level API does is controlled through
//! [`CleanConfig`], built via [`CleanConfigBuilder`]. The pattern table is
//! compiled once in [`CleanConfigBuilder::build`] and shared through an `Arc`,
//! so a config can be cloned into every task of a batch for free.

use crate::clean::TextCleaner;
use crate::error::ProseError;
use crate::patterns::PatternTable;
use crate::pipeline::extract::PageSource;
use crate::pipeline::figures::DEFAULT_MIN_FIGURE_BYTES;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for extracting and cleaning a document.
///
/// # Example
/// ```rust
/// use pdfprose::{CleanConfig, CleanMode, PageSelection};
///
/// let config = CleanConfig::builder()
///     .mode(CleanMode::Full)
///     .pages(PageSelection::Range(2, 12))
///     .concurrency(8)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Clone)]
pub struct CleanConfig {
    /// Full pipeline or ligatures-and-whitespace only. Default: Full.
    pub mode: CleanMode,

    /// Drop cover and citation pages. Default: true.
    ///
    /// Only meaningful in [`CleanMode::Full`].
    pub skip_cover_pages: bool,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Documents processed at once by the batch API. Default: 4.
    ///
    /// Each document occupies one blocking thread while pdfium reads it.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Smallest embedded image, in encoded bytes, that counts as a figure.
    /// Default: 10 000.
    pub min_figure_bytes: usize,

    /// The compiled pattern table. Default: the built-in table.
    pub cleaner: Arc<TextCleaner>,

    /// PDF decoder. If None, pdfium is bound on first use.
    pub source: Option<Arc<dyn PageSource>>,

    /// Batch progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            mode: CleanMode::default(),
            skip_cover_pages: true,
            pages: PageSelection::default(),
            password: None,
            concurrency: 4,
            download_timeout_secs: 120,
            min_figure_bytes: DEFAULT_MIN_FIGURE_BYTES,
            cleaner: TextCleaner::shared(),
            source: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CleanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanConfig")
            .field("mode", &self.mode)
            .field("skip_cover_pages", &self.skip_cover_pages)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("min_figure_bytes", &self.min_figure_bytes)
            .field("block_rules", &self.cleaner.table().block_rules.len())
            .field("line_rules", &self.cleaner.table().line_rules.len())
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl CleanConfig {
    pub fn builder() -> CleanConfigBuilder {
        CleanConfigBuilder {
            config: Self::default(),
            pattern_table: None,
        }
    }
}

/// Builder for [`CleanConfig`].
#[derive(Debug)]
pub struct CleanConfigBuilder {
    config: CleanConfig,
    pattern_table: Option<PatternTable>,
}

impl CleanConfigBuilder {
    pub fn mode(mut self, mode: CleanMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn skip_cover_pages(mut self, v: bool) -> Self {
        self.config.skip_cover_pages = v;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn min_figure_bytes(mut self, bytes: usize) -> Self {
        self.config.min_figure_bytes = bytes;
        self
    }

    /// Use a custom pattern table; compiled in [`build`](Self::build).
    pub fn pattern_table(mut self, table: PatternTable) -> Self {
        self.pattern_table = Some(table);
        self
    }

    /// Use an already compiled cleaner. Overrides [`pattern_table`](Self::pattern_table).
    pub fn cleaner(mut self, cleaner: Arc<TextCleaner>) -> Self {
        self.config.cleaner = cleaner;
        self.pattern_table = None;
        self
    }

    pub fn source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.config.source = Some(source);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, compiling the pattern table if one was set.
    pub fn build(mut self) -> Result<CleanConfig, ProseError> {
        if self.config.concurrency == 0 {
            return Err(ProseError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if self.config.download_timeout_secs == 0 {
            return Err(ProseError::InvalidConfig(
                "Download timeout must be at least 1 second".into(),
            ));
        }
        if let PageSelection::Range(start, end) = self.config.pages {
            if start > end {
                return Err(ProseError::InvalidConfig(format!(
                    "Page range {start}-{end} is reversed"
                )));
            }
        }
        if let Some(table) = self.pattern_table.take() {
            self.config.cleaner = Arc::new(TextCleaner::new(table)?);
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How much processing the page text receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanMode {
    /// Page filter, boilerplate stripping, rejoining. (default)
    #[default]
    Full,
    /// Ligatures and whitespace only, for downstream tools that want text
    /// as close to the decoder output as possible.
    Raw,
}

/// Specifies which pages of the PDF to read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The page number to report when nothing matched.
    pub fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 1,
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
        }
    }
}

impl std::str::FromStr for PageSelection {
    type Err = ProseError;

    /// Parse `all`, `5`, `3-10` or `1,3,7-9`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let parse_num = |part: &str| -> Result<usize, ProseError> {
            part.trim()
                .parse::<usize>()
                .map_err(|_| ProseError::InvalidConfig(format!("Invalid page number: '{part}'")))
        };

        if !s.contains(',') {
            if let Some((a, b)) = s.split_once('-') {
                return Ok(PageSelection::Range(parse_num(a)?, parse_num(b)?));
            }
            return Ok(PageSelection::Single(parse_num(s)?));
        }

        let mut pages = Vec::new();
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            match part.split_once('-') {
                Some((a, b)) => {
                    let (a, b) = (parse_num(a)?, parse_num(b)?);
                    if a > b {
                        return Err(ProseError::InvalidConfig(format!(
                            "Page range {a}-{b} is reversed"
                        )));
                    }
                    pages.extend(a..=b);
                }
                None => pages.push(parse_num(part)?),
            }
        }
        Ok(PageSelection::Set(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::LineRule;

    #[test]
    fn test_defaults() {
        let c = CleanConfig::default();
        assert_eq!(c.mode, CleanMode::Full);
        assert!(c.skip_cover_pages);
        assert_eq!(c.pages, PageSelection::All);
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.download_timeout_secs, 120);
        assert_eq!(c.min_figure_bytes, 10_000);
        assert_eq!(c.cleaner.table(), &PatternTable::default());
        assert!(c.source.is_none());
    }

    #[test]
    fn test_concurrency_clamped() {
        let c = CleanConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = CleanConfig::builder()
            .pages(PageSelection::Range(5, 2))
            .build()
            .unwrap_err();
        assert!(matches!(err, ProseError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(CleanConfig::builder().download_timeout_secs(0).build().is_err());
    }

    #[test]
    fn test_pattern_table_compiled_at_build() {
        let mut table = PatternTable::empty();
        table.line_rules.push(LineRule {
            name: "broken".into(),
            pattern: "(".into(),
        });
        let err = CleanConfig::builder().pattern_table(table).build().unwrap_err();
        assert!(matches!(err, ProseError::InvalidPattern { .. }));

        let c = CleanConfig::builder()
            .pattern_table(PatternTable::empty())
            .build()
            .unwrap();
        assert!(c.cleaner.table().line_rules.is_empty());
    }

    #[test]
    fn test_debug_redacts_password() {
        let c = CleanConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(4, 9).to_indices(5), vec![3, 4]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3]).to_indices(5), vec![0, 2]);
        assert_eq!(PageSelection::All.to_indices(0), Vec::<usize>::new());
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("5".parse::<PageSelection>().unwrap(), PageSelection::Single(5));
        assert_eq!("3-10".parse::<PageSelection>().unwrap(), PageSelection::Range(3, 10));
        assert_eq!(
            "1,3,7-9".parse::<PageSelection>().unwrap(),
            PageSelection::Set(vec![1, 3, 7, 8, 9])
        );
        assert!("x".parse::<PageSelection>().is_err());
        assert!("1,9-7".parse::<PageSelection>().is_err());
    }
}
