//! Page text extraction: the PDF decoder behind the cleaning pipeline.
//!
//! [`PageSource`] is the seam: anything that can turn a PDF path into one
//! string per page, in reading order, can feed the cleaner. [`PdfiumSource`]
//! is the production implementation.
//!
//! pdfium is synchronous and not async-safe, so the async helpers at the
//! bottom of this module run every source call inside
//! `tokio::task::spawn_blocking`.

use crate::config::PageSelection;
use crate::error::ProseError;
use crate::output::DocumentMetadata;
use crate::pipeline::figures::encode_png;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Environment variable naming the pdfium library file, or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Raw text of one page as produced by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// 0-indexed page number.
    pub index: usize,
    pub text: String,
}

/// Selected pages of one document, in page order.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub metadata: DocumentMetadata,
    pub pages: Vec<SourcePage>,
}

/// One embedded image, encoded and ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFigure {
    /// 0-indexed page the image sits on.
    pub page_index: usize,
    pub bytes: Vec<u8>,
    /// File extension matching `bytes`, without the dot.
    pub extension: String,
}

/// A PDF decoder that yields one text string per page.
///
/// Implementations are called from blocking threads and may block.
/// Failures to open a document must be reported as one of the "source
/// unavailable" errors (see [`ProseError::is_source_unavailable`]); they are
/// never retried by the library.
pub trait PageSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Read the selected pages. A document with no pages yields no pages;
    /// a selection that matches nothing in a non-empty document is
    /// [`ProseError::PageOutOfRange`].
    fn read_pages(
        &self,
        path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
    ) -> Result<SourceDocument, ProseError>;

    fn read_metadata(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, ProseError>;

    /// Every embedded image on the selected pages, in page order.
    ///
    /// Sources without image support report none.
    fn read_figures(
        &self,
        _path: &Path,
        _password: Option<&str>,
        _selection: &PageSelection,
    ) -> Result<Vec<SourceFigure>, ProseError> {
        Ok(Vec::new())
    }
}

/// Resolve a page selection against a document's page count.
pub fn select_indices(selection: &PageSelection, total_pages: usize) -> Result<Vec<usize>, ProseError> {
    if total_pages == 0 {
        return Ok(Vec::new());
    }
    let indices = selection.to_indices(total_pages);
    if indices.is_empty() {
        return Err(ProseError::PageOutOfRange {
            page: selection.first_requested(),
            total: total_pages,
        });
    }
    Ok(indices)
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`PageSource`] backed by a dynamically bound pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumSource {
    library_path: Option<PathBuf>,
}

impl PdfiumSource {
    /// Bind from `PDFIUM_LIB_PATH` if set, else from the working directory
    /// or the system library search path.
    pub fn from_env() -> Self {
        Self {
            library_path: std::env::var_os(PDFIUM_LIB_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Bind a specific library file, or the platform library name inside a
    /// directory.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, ProseError> {
        let bindings = match &self.library_path {
            Some(path) => {
                let lib = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(path)
                } else {
                    path.clone()
                };
                debug!("Binding pdfium from {}", lib.display());
                Pdfium::bind_to_library(&lib)
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ProseError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageSource for PdfiumSource {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn read_pages(
        &self,
        path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
    ) -> Result<SourceDocument, ProseError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, path, password)?;
        let metadata = metadata_of(&document);
        info!("PDF loaded: {} pages", metadata.page_count);

        let indices = select_indices(selection, metadata.page_count)?;
        let pages = document.pages();
        let mut out = Vec::with_capacity(indices.len());

        for idx in indices {
            let text = match pages.get(idx as u16) {
                Ok(page) => match page.text() {
                    Ok(text) => text.all(),
                    Err(e) => {
                        warn!("Page {}: text layer unreadable, using empty text ({:?})", idx + 1, e);
                        String::new()
                    }
                },
                Err(e) => {
                    warn!("Page {}: could not be loaded, using empty text ({:?})", idx + 1, e);
                    String::new()
                }
            };
            debug!("Page {}: {} chars extracted", idx + 1, text.chars().count());
            out.push(SourcePage { index: idx, text });
        }

        Ok(SourceDocument {
            metadata,
            pages: out,
        })
    }

    fn read_metadata(
        &self,
        path: &Path,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, ProseError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, path, password)?;
        Ok(metadata_of(&document))
    }

    fn read_figures(
        &self,
        path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
    ) -> Result<Vec<SourceFigure>, ProseError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, path, password)?;
        let pages = document.pages();
        let indices = select_indices(selection, pages.len() as usize)?;
        let mut out = Vec::new();

        for idx in indices {
            let page = match pages.get(idx as u16) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Page {}: could not be loaded, no figures ({:?})", idx + 1, e);
                    continue;
                }
            };
            for object in page.objects().iter() {
                let Some(image) = object.as_image_object() else {
                    continue;
                };
                let encoded = image
                    .get_raw_image()
                    .map_err(|e| format!("{:?}", e))
                    .and_then(|img| encode_png(&img).map_err(|e| e.to_string()));
                match encoded {
                    Ok(bytes) => out.push(SourceFigure {
                        page_index: idx,
                        bytes,
                        extension: "png".into(),
                    }),
                    Err(e) => warn!("Page {}: skipping unreadable image ({})", idx + 1, e),
                }
            }
        }

        debug!("{} embedded images found", out.len());
        Ok(out)
    }
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ProseError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ProseError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                ProseError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            ProseError::SourceUnavailable {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn metadata_of(document: &PdfDocument<'_>) -> DocumentMetadata {
    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata
            .get(tag)
            .map(|t| t.value().trim().to_string())
            .filter(|v| !v.is_empty())
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

// ── Async wrappers ───────────────────────────────────────────────────────

/// Run [`PageSource::read_pages`] on the blocking thread pool.
pub async fn read_document(
    source: Arc<dyn PageSource>,
    path: &Path,
    password: Option<&str>,
    selection: &PageSelection,
) -> Result<SourceDocument, ProseError> {
    let path = path.to_path_buf();
    let password = password.map(str::to_string);
    let selection = selection.clone();

    tokio::task::spawn_blocking(move || source.read_pages(&path, password.as_deref(), &selection))
        .await
        .map_err(|e| ProseError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Run [`PageSource::read_metadata`] on the blocking thread pool.
pub async fn read_metadata(
    source: Arc<dyn PageSource>,
    path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, ProseError> {
    let path = path.to_path_buf();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || source.read_metadata(&path, password.as_deref()))
        .await
        .map_err(|e| ProseError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Run [`PageSource::read_figures`] on the blocking thread pool.
pub async fn read_figures(
    source: Arc<dyn PageSource>,
    path: &Path,
    password: Option<&str>,
    selection: &PageSelection,
) -> Result<Vec<SourceFigure>, ProseError> {
    let path = path.to_path_buf();
    let password = password.map(str::to_string);
    let selection = selection.clone();

    tokio::task::spawn_blocking(move || source.read_figures(&path, password.as_deref(), &selection))
        .await
        .map_err(|e| ProseError::Internal(format!("Figure task panicked: {}", e)))?
}
