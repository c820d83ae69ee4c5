//! Document-level extraction entry points.
//!
//! These wrap the pure text pipeline in [`crate::clean`] with the I/O around
//! it: resolve the input, read page text through a [`PageSource`], clean it,
//! and report what happened to each page. Use [`crate::stream`] for many
//! documents at once.

use crate::config::{CleanConfig, CleanMode};
use crate::error::ProseError;
use crate::output::{CleanOutput, DocumentMetadata, ExtractionStats, PageReport, TextStats};
use crate::pipeline::extract::{
    read_document, read_figures, read_metadata, PageSource, PdfiumSource, SourceDocument,
};
use crate::pipeline::figures::{filter_figures, write_figures, ExtractedFigure};
use crate::pipeline::input;
use crate::slug::{slugify, DEFAULT_SLUG_LENGTH};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract and clean the text of a PDF file or URL.
///
/// # Arguments
/// * `input`: local file path or HTTP/HTTPS URL to a PDF
/// * `config`: extraction configuration
///
/// # Errors
/// Returns `Err(ProseError)` when the document cannot be obtained or opened,
/// or when the page selection matches no page. A PDF with zero pages is not
/// an error; it yields empty text.
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &CleanConfig,
) -> Result<CleanOutput, ProseError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    // ── Step 2: Read page text ───────────────────────────────────────────
    let source = resolve_source(config);
    debug!("Reading pages with '{}'", source.name());
    let extract_start = Instant::now();
    let document = read_document(
        source,
        resolved.path(),
        config.password.as_deref(),
        &config.pages,
    )
    .await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Read {} of {} pages in {}ms",
        document.pages.len(),
        document.metadata.page_count,
        extract_duration_ms
    );

    // ── Step 3: Clean ────────────────────────────────────────────────────
    let clean_start = Instant::now();
    let (text, pages) = clean_document(&document, config);
    let clean_duration_ms = clean_start.elapsed().as_millis() as u64;

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let mut stats = ExtractionStats {
        total_pages: document.metadata.page_count,
        text: TextStats::of(&text),
        extract_duration_ms,
        clean_duration_ms,
        ..Default::default()
    };
    stats.count_pages(&pages);
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Extraction complete: {}/{} pages kept, {} words, {}ms total",
        stats.kept_pages, stats.selected_pages, stats.text.words, stats.total_duration_ms
    );

    Ok(CleanOutput {
        text,
        pages,
        metadata: document.metadata,
        stats,
    })
}

/// Extract a PDF and write the cleaned text directly to a file.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial file behind.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &CleanConfig,
) -> Result<ExtractionStats, ProseError> {
    let output = extract(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.text).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside another runtime.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &CleanConfig,
) -> Result<CleanOutput, ProseError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ProseError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed when this
/// function returns.
///
/// # Example
/// ```rust,no_run
/// use pdfprose::{extract_from_bytes, CleanConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("paper.pdf")?;
/// let output = extract_from_bytes(&bytes, &CleanConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &CleanConfig,
) -> Result<CleanOutput, ProseError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ProseError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ProseError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    extract(&path, config).await
}

/// Read PDF metadata without extracting any page text.
///
/// Honours the config's password, download timeout and page source.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &CleanConfig,
) -> Result<DocumentMetadata, ProseError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    read_metadata(
        resolve_source(config),
        resolved.path(),
        config.password.as_deref(),
    )
    .await
}

/// Write the figures embedded in a PDF to `output_dir`.
///
/// Images on the selected pages that encode to at least
/// `config.min_figure_bytes` are written as `figure_1.png`, `figure_2.png`,
/// ... in page order. `output_dir` is created even when no image qualifies.
pub async fn extract_figures(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &CleanConfig,
) -> Result<Vec<ExtractedFigure>, ProseError> {
    let input_str = input_str.as_ref();
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let found = read_figures(
        resolve_source(config),
        resolved.path(),
        config.password.as_deref(),
        &config.pages,
    )
    .await?;

    let total = found.len();
    let figures = filter_figures(found, config.min_figure_bytes);
    let written = write_figures(&figures, output_dir.as_ref()).await?;
    info!(
        "{}: {} of {} images saved as figures in {}",
        input_str,
        written.len(),
        total,
        output_dir.as_ref().display()
    );
    Ok(written)
}

/// Write `text` to `<dir>/<slug of title>.txt` and return the path.
///
/// `dir` is created if needed and the write is atomic.
pub async fn save_text(
    text: &str,
    title: &str,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, ProseError> {
    let path = dir
        .as_ref()
        .join(format!("{}.txt", slugify(title, DEFAULT_SLUG_LENGTH)));
    write_atomic(&path, text).await?;
    info!("Saved {} chars to {}", text.chars().count(), path.display());
    Ok(path)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The configured page source, or pdfium bound from the environment.
fn resolve_source(config: &CleanConfig) -> Arc<dyn PageSource> {
    match config.source {
        Some(ref source) => Arc::clone(source),
        None => Arc::new(PdfiumSource::from_env()),
    }
}

/// Run the configured pipeline over a document's pages.
fn clean_document(document: &SourceDocument, config: &CleanConfig) -> (String, Vec<PageReport>) {
    let texts: Vec<&str> = document.pages.iter().map(|p| p.text.as_str()).collect();

    let cleaned = match config.mode {
        CleanMode::Full => config
            .cleaner
            .clean_pages_with_report(&texts, config.skip_cover_pages),
        CleanMode::Raw => config.cleaner.raw_pages(&texts),
    };

    let pages = document
        .pages
        .iter()
        .zip(cleaned.dispositions)
        .map(|(page, disposition)| PageReport {
            page_num: page.index + 1,
            chars: page.text.chars().count(),
            disposition,
        })
        .collect();

    (cleaned.text, pages)
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), ProseError> {
    let write_err = |source: std::io::Error| ProseError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    let written = match tokio::fs::write(&tmp_path, contents).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        // Never leave the temp file behind.
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_text_writes_slugged_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");

        let path = save_text("Body text.", "Coastal Dunes: A Review!", &out_dir)
            .await
            .unwrap();

        assert_eq!(path, out_dir.join("coastal_dunes_a_review.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Body text.");
        assert!(!out_dir.join("coastal_dunes_a_review.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_text_untitled() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_text("x", "???", dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "untitled.txt");
    }

    #[tokio::test]
    async fn test_write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.txt");
        write_atomic(&path, "first").await.unwrap();
        write_atomic(&path, "second").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[tokio::test]
    async fn test_write_atomic_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        let path = dir.path().join("paper.txt");
        std::fs::create_dir(&path).unwrap();

        let err = write_atomic(&path, "text").await.unwrap_err();

        assert!(matches!(err, ProseError::OutputWriteFailed { .. }));
        assert!(!dir.path().join("paper.txt.tmp").exists());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let err = extract("/no/such/paper.pdf", &CleanConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProseError::FileNotFound { .. }));
    }
}
