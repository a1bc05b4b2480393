//! Text extraction from PDF files.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("text extraction failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the text of every page. The result always ends with a newline
    /// unless the document has no text at all.
    pub async fn extract(&self, pdf_path: &Path) -> Result<String, PdfError> {
        if !pdf_path.is_file() {
            return Err(PdfError::NotFound(pdf_path.to_path_buf()));
        }

        let path = pdf_path.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
            .await
            // The parser panics on some malformed files.
            .map_err(|e| PdfError::Failed(e.to_string()))?
            .map_err(|e| PdfError::Failed(e.to_string()))?;

        let text = normalize_text(&raw);
        tracing::debug!(
            "Extracted {} characters from {}",
            text.len(),
            pdf_path.display()
        );
        Ok(text)
    }
}

/// Page breaks become newlines and the text is newline terminated.
fn normalize_text(raw: &str) -> String {
    let mut text = raw.replace('\u{c}', "\n");
    if !text.trim().is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_newline_terminated() {
        assert_eq!(normalize_text("only page"), "only page\n");
        assert_eq!(normalize_text("only page\n"), "only page\n");
    }

    #[test]
    fn page_breaks_become_newlines() {
        assert_eq!(normalize_text("first\u{c}second"), "first\nsecond\n");
    }

    #[test]
    fn blank_documents_stay_blank() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("  "), "  ");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = PdfExtractor::new()
            .extract(Path::new("/nonexistent/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_pdf_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\nnot really a pdf").unwrap();

        let err = PdfExtractor::new().extract(&pdf).await.unwrap_err();

        assert!(matches!(err, PdfError::Failed(_)));
    }
}
