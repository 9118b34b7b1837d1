//! Résumé text extraction.
//!
//! Pages are concatenated in document order with whatever page-break whitespace
//! `pdf-extract` emits. No layout reconstruction, no OCR.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("the uploaded file is empty")]
    Empty,

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("PDF parser aborted: {0}")]
    Aborted(String),
}

/// Extracts plain text from PDF bytes held in memory. Pages keep their order
/// and are separated by a newline. CPU-bound; call [`extract_resume_text`]
/// from async code.
pub fn extract_text_from_pdf_mem(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map(|pages| pages.join("\n"))
        .map_err(|e| ExtractionError::Pdf(e.to_string()))
}

/// Runs extraction on the blocking pool. A parser panic is reported as an
/// extraction failure for this request only.
pub async fn extract_resume_text(bytes: Bytes) -> Result<String, ExtractionError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || extract_text_from_pdf_mem(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            ExtractionError::Aborted(e.to_string())
        })??;

    debug!("Extracted {} chars from {} byte résumé", text.chars().count(), size);
    Ok(text)
}
