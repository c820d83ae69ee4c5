//! Error types for the pdfprose library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ProseError`]: **fatal**, the document cannot be processed at all
//!   (missing file, not a PDF, wrong password, bad pattern table). Returned as
//!   `Err(ProseError)` from the top-level `extract*` functions.
//!
//! * [`DocumentError`]: **non-fatal**, one document of a batch failed while
//!   the others are fine. Yielded by [`crate::stream::extract_stream`] so a
//!   single unreadable PDF does not sink a whole collection.
//!
//! The text-cleaning pipeline itself never fails: every stage is total over
//! UTF-8 input. Errors only come from the collaborators around it (input
//! resolution, the PDF decoder, pattern-table loading, output writing).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfprose library.
#[derive(Debug, Error)]
pub enum ProseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF decoder errors ────────────────────────────────────────────────
    /// The PDF decoder could not open or read the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    SourceUnavailable { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection matched no page of a non-empty document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium system-wide, or set PDFIUM_LIB_PATH to the library file\n\
(or the directory containing it).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Pattern-table errors ──────────────────────────────────────────────
    /// A block or line rule does not compile as a regular expression.
    #[error("Pattern rule '{rule}' is not a valid regular expression: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A pattern file could not be read or parsed.
    #[error("Failed to load pattern file '{path}': {detail}")]
    PatternFile { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProseError {
    /// True when the document itself could not be obtained or opened.
    ///
    /// These conditions are reported to the caller as-is; whether to retry is
    /// the caller's decision.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            ProseError::FileNotFound { .. }
                | ProseError::PermissionDenied { .. }
                | ProseError::InvalidInput { .. }
                | ProseError::DownloadFailed { .. }
                | ProseError::DownloadTimeout { .. }
                | ProseError::NotAPdf { .. }
                | ProseError::SourceUnavailable { .. }
                | ProseError::PasswordRequired { .. }
                | ProseError::WrongPassword { .. }
        )
    }
}

/// A non-fatal error for a single document in a batch.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The document could not be found, downloaded or opened.
    #[error("Document {index} ('{input}'): source unavailable: {detail}")]
    SourceUnavailable {
        index: usize,
        input: String,
        detail: String,
    },

    /// The document was opened but processing failed.
    #[error("Document {index} ('{input}'): {detail}")]
    Failed {
        index: usize,
        input: String,
        detail: String,
    },
}

impl DocumentError {
    /// Wrap a fatal error for the document at `index`.
    pub fn from_prose(index: usize, input: impl Into<String>, err: &ProseError) -> Self {
        let input = input.into();
        let detail = err.to_string();
        if err.is_source_unavailable() {
            DocumentError::SourceUnavailable {
                index,
                input,
                detail,
            }
        } else {
            DocumentError::Failed {
                index,
                input,
                detail,
            }
        }
    }

    /// 0-based position of the document in the batch input list.
    pub fn index(&self) -> usize {
        match self {
            DocumentError::SourceUnavailable { index, .. } | DocumentError::Failed { index, .. } => {
                *index
            }
        }
    }

    /// The input path or URL as given by the caller.
    pub fn input(&self) -> &str {
        match self {
            DocumentError::SourceUnavailable { input, .. } | DocumentError::Failed { input, .. } => {
                input
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unavailable_grouping() {
        assert!(ProseError::FileNotFound {
            path: "missing.pdf".into()
        }
        .is_source_unavailable());
        assert!(ProseError::SourceUnavailable {
            path: "broken.pdf".into(),
            detail: "bad xref".into()
        }
        .is_source_unavailable());
        assert!(!ProseError::InvalidConfig("x".into()).is_source_unavailable());
        assert!(!ProseError::PageOutOfRange { page: 9, total: 3 }.is_source_unavailable());
    }

    #[test]
    fn document_error_keeps_source_distinction() {
        let missing = ProseError::FileNotFound {
            path: "a.pdf".into(),
        };
        let e = DocumentError::from_prose(2, "a.pdf", &missing);
        assert!(matches!(e, DocumentError::SourceUnavailable { index: 2, .. }));
        assert_eq!(e.input(), "a.pdf");

        let out_of_range = ProseError::PageOutOfRange { page: 0, total: 4 };
        let e = DocumentError::from_prose(0, "b.pdf", &out_of_range);
        assert!(matches!(e, DocumentError::Failed { .. }));
        assert_eq!(e.index(), 0);
    }

    #[test]
    fn page_out_of_range_display() {
        let e = ProseError::PageOutOfRange { page: 0, total: 12 };
        assert!(e.to_string().contains("12 pages"), "got: {e}");
    }

    #[test]
    fn invalid_pattern_names_rule() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let e = ProseError::InvalidPattern {
            rule: "journal-footer".into(),
            source,
        };
        assert!(e.to_string().contains("journal-footer"));
    }
}
