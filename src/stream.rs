//! Batch API: extract many documents concurrently.
//!
//! Documents are independent, so up to `config.concurrency` of them run at
//! once. [`extract_stream`] yields each result as soon as it is ready, in
//! completion order; [`extract_batch`] waits for all of them and restores
//! input order. A document that fails is reported as a [`DocumentError`] and
//! never aborts the rest of the batch.

use crate::config::CleanConfig;
use crate::convert::extract;
use crate::error::DocumentError;
use crate::output::CleanOutput;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// Outcome for one input of a batch.
#[derive(Debug)]
pub struct DocumentResult {
    /// 0-based position in the input list.
    pub index: usize,
    /// The path or URL as given.
    pub input: String,
    pub output: Result<CleanOutput, DocumentError>,
}

impl DocumentResult {
    pub fn is_ok(&self) -> bool {
        self.output.is_ok()
    }
}

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Extract every input, yielding results in completion order.
///
/// The progress callback, if any, hears `on_batch_start` immediately and
/// `on_batch_complete` once the stream is exhausted.
pub fn extract_stream<I, S>(inputs: I, config: &CleanConfig) -> DocumentStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let inputs: Vec<String> = inputs.into_iter().map(Into::into).collect();
    let total = inputs.len();
    let concurrency = config.concurrency.max(1);
    info!("Starting batch: {} documents, concurrency {}", total, concurrency);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let config_clone = config.clone();
    let results = stream::iter(inputs.into_iter().enumerate().map(move |(index, input)| {
        let cfg = config_clone.clone();
        async move {
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_document_start(index, &input);
            }
            let output = match extract(&input, &cfg).await {
                Ok(out) => {
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_complete(index, &input, out.text.len());
                    }
                    Ok(out)
                }
                Err(e) => {
                    warn!("Document {} ('{}') failed: {}", index, input, e);
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_error(index, &input, &e.to_string());
                    }
                    Err(DocumentError::from_prose(index, input.as_str(), &e))
                }
            };
            DocumentResult {
                index,
                input,
                output,
            }
        }
    }))
    .buffer_unordered(concurrency);

    // Count successes as they pass so the completion event can report them.
    let callback = config.progress_callback.clone();
    let finished = stream::unfold(
        (results, 0usize, callback),
        move |(mut results, succeeded, callback)| async move {
            match results.next().await {
                Some(result) => {
                    let succeeded = succeeded + usize::from(result.is_ok());
                    Some((result, (results, succeeded, callback)))
                }
                None => {
                    info!("Batch complete: {}/{} documents succeeded", succeeded, total);
                    if let Some(ref cb) = callback {
                        cb.on_batch_complete(total, succeeded);
                    }
                    None
                }
            }
        },
    );

    Box::pin(finished)
}

/// Extract every input and return the results in input order.
pub async fn extract_batch<I, S>(inputs: I, config: &CleanConfig) -> Vec<DocumentResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut results: Vec<DocumentResult> = extract_stream(inputs, config).collect().await;
    results.sort_by_key(|r| r.index);
    results
}
