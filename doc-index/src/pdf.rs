//! PDF text extraction.

use std::path::Path;

use tracing::debug;

use crate::errors::DocIndexError;

/// Extracts the full text of a PDF and normalizes it for chunking.
///
/// Normalization drops null characters that some extractors emit for
/// unmapped glyphs, trims per-line whitespace, and removes blank lines.
///
/// # Errors
/// Returns `DocIndexError::Pdf` when the file cannot be parsed.
pub fn extract_pdf_text(path: &Path) -> Result<String, DocIndexError> {
    let raw = pdf_extract::extract_text(path)
        .map_err(|e| DocIndexError::Pdf(format!("{}: {e}", path.display())))?;

    let text = raw
        .replace('\0', "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    debug!(
        target: "doc_index::pdf",
        path = %path.display(),
        chars = text.len(),
        "pdf text extracted"
    );

    Ok(text)
}
