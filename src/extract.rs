//! Text extraction for source documents.
//!
//! Resumes arrive as PDF or plain text, job descriptions as plain text.
//! Extraction returns UTF-8 text or an [`ExtractionError`]; a document that
//! yields no meaningful text is rejected here rather than being allowed to
//! produce an empty analysis downstream.

use std::path::Path;

use crate::error::ExtractionError;

/// Minimum number of non-whitespace characters for extracted text to count
/// as meaningful.
const MIN_TEXT_CHARS: usize = 50;

/// Extract text from a document, dispatching on the file extension.
/// `.pdf` goes through the PDF extractor; everything else is read as UTF-8.
pub fn extract_document(path: &Path) -> Result<String, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::NotFound(path.to_path_buf()));
    }

    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    let text = if is_pdf {
        extract_pdf(path)?
    } else {
        extract_plain_text(path)?
    };

    ensure_meaningful(path, text)
}

fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractionError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn extract_plain_text(path: &Path) -> Result<String, ExtractionError> {
    std::fs::read_to_string(path).map_err(|source| ExtractionError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_meaningful(path: &Path, text: String) -> Result<String, ExtractionError> {
    let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
    if meaningful < MIN_TEXT_CHARS {
        return Err(ExtractionError::Empty(path.to_path_buf()));
    }
    Ok(text)
}
