//! Figure extraction: embedded images written out next to the cleaned text.
//!
//! Independent of text cleaning. The decoder hands over every image on the
//! selected pages; images smaller than the configured minimum are icons,
//! logos and rules, and are dropped. Survivors are numbered in page order as
//! `figure_1.png`, `figure_2.jpg`, ...

use crate::error::ProseError;
use crate::pipeline::extract::SourceFigure;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Images below this many encoded bytes are not figures.
pub const DEFAULT_MIN_FIGURE_BYTES: usize = 10_000;

/// A figure written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFigure {
    pub path: PathBuf,
    /// 1-indexed page the image was found on.
    pub page_num: usize,
    /// Size of the written file.
    pub bytes: usize,
}

/// Encode a decoded image as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Keep the images of at least `min_bytes`, preserving order.
pub fn filter_figures(figures: Vec<SourceFigure>, min_bytes: usize) -> Vec<SourceFigure> {
    figures
        .into_iter()
        .filter(|f| {
            let keep = f.bytes.len() >= min_bytes;
            if !keep {
                debug!(
                    "Page {}: skipping {}-byte image",
                    f.page_index + 1,
                    f.bytes.len()
                );
            }
            keep
        })
        .collect()
}

/// Write `figures` into `dir` as `figure_<n>.<ext>`, numbered from 1.
///
/// `dir` is created even when there is nothing to write. Existing files
/// with the same names are overwritten.
pub async fn write_figures(
    figures: &[SourceFigure],
    dir: &Path,
) -> Result<Vec<ExtractedFigure>, ProseError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ProseError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut written = Vec::with_capacity(figures.len());
    for (n, figure) in figures.iter().enumerate() {
        let path = dir.join(format!(
            "figure_{}.{}",
            n + 1,
            file_extension(&figure.extension)
        ));
        tokio::fs::write(&path, &figure.bytes)
            .await
            .map_err(|source| ProseError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
        written.push(ExtractedFigure {
            path,
            page_num: figure.page_index + 1,
            bytes: figure.bytes.len(),
        });
    }
    Ok(written)
}

fn file_extension(ext: &str) -> String {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "" => "png".to_string(),
        "jpeg" => "jpg".to_string(),
        other => other.to_string(),
    }
}
