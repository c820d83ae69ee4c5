//! # pdfprose
//!
//! Reconstruct readable prose from the text layer of academic PDFs.
//!
//! Text extracted from journal articles is full of publisher furniture:
//! download cover pages, "To cite this article" notices, running headers,
//! page numbers, licence lines and sentences broken at every line end. This
//! crate removes that noise with a data-driven pattern table and rejoins the
//! lines into paragraphs, leaving headings on their own lines.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Extract     one text string per page via pdfium (spawn_blocking)
//!  ├─ 3. Characters  CRLF → LF, ligatures → ASCII letters
//!  ├─ 4. Pages       drop cover / citation pages and blank pages
//!  ├─ 5. Boilerplate block notices, running headers, page numbers
//!  ├─ 6. Rejoin      merge broken lines, keep headings apart
//!  └─ 7. Output      cleaned text + per-page report + stats
//! ```
//!
//! Steps 3 to 6 are pure and synchronous; they are available on their own
//! through [`clean_raw_text`] and [`TextCleaner`]. [`extract_figures`] reads
//! the same document for its embedded images and writes them to disk.
//!
//! ## Quick Start
//!
//! ```rust
//! let pages = [
//!     "You may also like\nRelated articles",
//!     "1. Introduction\nBarrier islands respond to storms by\nmigrating landward.\n3",
//! ];
//! let text = pdfprose::clean_raw_text(&pages);
//! assert_eq!(
//!     text,
//!     "1. Introduction\nBarrier islands respond to storms by migrating landward."
//! );
//! ```
//!
//! For whole documents:
//!
//! ```rust,no_run
//! use pdfprose::{extract, CleanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CleanConfig::default();
//!     let output = extract("paper.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} of {} pages kept", output.stats.kept_pages, output.stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfprose` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfprose = { version = "0.2", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! Page text comes from a dynamically bound pdfium library. Install it
//! system-wide or set `PDFIUM_LIB_PATH` to the library file or its directory.
//! The text pipeline itself needs nothing beyond this crate.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clean;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod progress;
pub mod slug;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clean::{classify_line, clean_raw_text, CleanedPages, TextCleaner};
pub use config::{CleanConfig, CleanConfigBuilder, CleanMode, PageSelection};
pub use convert::{
    extract, extract_figures, extract_from_bytes, extract_sync, extract_to_file, inspect, save_text,
};
pub use error::{DocumentError, ProseError};
pub use output::{
    CleanOutput, DocumentMetadata, ExtractionStats, PageDisposition, PageReport, TextStats,
};
pub use patterns::{BlockRule, LineRule, PatternFile, PatternTable};
pub use pipeline::classify::{LineClass, LineEnding};
pub use pipeline::extract::{PageSource, PdfiumSource, SourceDocument, SourceFigure, SourcePage};
pub use pipeline::figures::{ExtractedFigure, DEFAULT_MIN_FIGURE_BYTES};
pub use pipeline::ligature::fix_ligatures;
pub use pipeline::whitespace::{normalise_line_endings, normalize_whitespace, stabilize_line_breaks};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use slug::slugify;
pub use stream::{extract_batch, extract_stream, DocumentResult, DocumentStream};
