use super::sanitize::sanitize_extracted_text;
use super::types::{untitled_section, DocumentSection, SectionExtractor};
use super::ExtractionError;

/// UTF-8 text files: every non-empty line is a requirement.
pub struct PlainTextExtractor;

impl SectionExtractor for PlainTextExtractor {
    fn extract_sections(&self, bytes: &[u8]) -> Result<Vec<DocumentSection>, ExtractionError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
        Ok(untitled_section(&sanitize_extracted_text(text)))
    }
}
