//! Pipeline stages for turning PDF page text into clean prose.
//!
//! Each submodule implements one step and is tested on its own.
//! [`crate::clean::TextCleaner`] wires the text stages together; the document
//! API in [`crate::convert`] adds the I/O stages around them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ ligature ──▶ page_filter ──▶ boilerplate
//! (URL/path) (pdfium)                 (cover pages)
//!       ──▶ whitespace ──▶ rejoin ──▶ whitespace
//!                          (classify)
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local file
//! 2. [`extract`]: one text string per selected page; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`ligature`]: expand typographic ligature code points
//! 4. [`page_filter`]: drop cover and citation pages added by publishers
//! 5. [`boilerplate`]: remove multi-line notices, running headers and page numbers
//! 6. [`whitespace`]: collapse spaces and blank-line runs, then trim lines
//! 7. [`rejoin`]: merge lines broken mid-sentence, using [`classify`] to
//!    recognise headings and sentence ends
//!
//! [`figures`] sits beside the text stages: it writes the embedded images
//! the decoder finds and shares nothing with cleaning.

pub mod boilerplate;
pub mod classify;
pub mod extract;
pub mod figures;
pub mod input;
pub mod ligature;
pub mod page_filter;
pub mod rejoin;
pub mod whitespace;
