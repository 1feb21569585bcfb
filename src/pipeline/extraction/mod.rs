pub mod types;
pub mod sanitize;
pub mod docx;
pub mod pdf;
pub mod text;

pub use types::*;
pub use sanitize::*;
pub use docx::*;
pub use pdf::*;
pub use text::*;

use thiserror::Error;

use crate::pipeline::import::{content_matches, FileCategory, SourceDocument};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOCX container error: {0}")]
    Zip(String),

    #[error("DOCX XML error: {0}")]
    Xml(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Unsupported format for extraction")]
    UnsupportedFormat,

    #[error("File content does not match its extension (expected {0})")]
    ContentMismatch(&'static str),
}

/// Read `source` and split it into sections with the extractor for its format.
pub fn extract_document(source: &SourceDocument) -> Result<ExtractedDocument, ExtractionError> {
    let bytes = std::fs::read(&source.path)?;

    let extractor: &dyn SectionExtractor = match source.category {
        FileCategory::Docx => &DocxExtractor,
        FileCategory::Pdf => &PdfTextExtractor,
        FileCategory::PlainText => &PlainTextExtractor,
        FileCategory::Unsupported => return Err(ExtractionError::UnsupportedFormat),
    };

    if !content_matches(source.category, &bytes) {
        tracing::warn!(
            path = %source.path.display(),
            claimed = source.category.as_str(),
            "File content does not match its extension"
        );
        return Err(ExtractionError::ContentMismatch(source.category.as_str()));
    }

    let sections = extractor.extract_sections(&bytes)?;
    let document = ExtractedDocument {
        display_name: source.display_name.clone(),
        category: source.category,
        sections,
    };

    tracing::debug!(
        doc = %document.display_name,
        format = source.category.as_str(),
        sections = document.sections.len(),
        requirements = document.requirement_count(),
        "Text extracted"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn plain_text_document_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("login.txt");
        std::fs::write(&path, "O usuário faz login\n\nO usuário faz logout\n").unwrap();
        let doc = extract_document(&SourceDocument {
            path,
            display_name: "login".into(),
            category: FileCategory::PlainText,
        })
        .unwrap();
        assert_eq!(doc.display_name, "login");
        assert_eq!(doc.requirement_count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = extract_document(&SourceDocument {
            path: PathBuf::from("/nonexistent/req.txt"),
            display_name: "req".into(),
            category: FileCategory::PlainText,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn unsupported_category_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        let err = extract_document(&SourceDocument {
            path,
            display_name: "x".into(),
            category: FileCategory::Unsupported,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat));
    }

    #[test]
    fn latin1_text_is_content_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acao.txt");
        std::fs::write(&path, [0x41, 0xE7, 0xE3, 0x6F]).unwrap();
        let err = extract_document(&SourceDocument {
            path,
            display_name: "acao".into(),
            category: FileCategory::PlainText,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionError::ContentMismatch("plain_text")));
    }

    #[test]
    fn fake_pdf_is_content_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("falso.pdf");
        std::fs::write(&path, b"just text").unwrap();
        let err = extract_document(&SourceDocument {
            path,
            display_name: "falso".into(),
            category: FileCategory::Pdf,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractionError::ContentMismatch("pdf")));
    }
}
