use super::sanitize::sanitize_extracted_text;
use super::types::{untitled_section, DocumentSection, SectionExtractor};
use super::ExtractionError;

/// PDF text layer via pdf-extract. Scanned PDFs yield no sections.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}

impl SectionExtractor for PdfTextExtractor {
    fn extract_sections(&self, bytes: &[u8]) -> Result<Vec<DocumentSection>, ExtractionError> {
        let pages = self.page_texts(bytes)?;
        let text = pages.join("\n");
        let sections = untitled_section(&sanitize_extracted_text(&text));
        if sections.is_empty() {
            tracing::warn!(pages = pages.len(), "PDF has no text layer");
        }
        Ok(sections)
    }
}
