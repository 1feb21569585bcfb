use serde::Serialize;

use super::ExtractionError;
use crate::pipeline::import::FileCategory;

/// A titled group of requirement lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSection {
    /// Empty for text that precedes the first heading, and for formats without headings.
    pub title: String,
    pub requirements: Vec<String>,
}

impl DocumentSection {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.requirements.is_empty()
    }
}

/// Text of one source document, split into sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    pub display_name: String,
    pub category: FileCategory,
    pub sections: Vec<DocumentSection>,
}

impl ExtractedDocument {
    pub fn requirement_count(&self) -> usize {
        self.sections.iter().map(|s| s.requirements.len()).sum()
    }

    /// Titles and requirements, one per line, in document order.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            if !section.title.is_empty() {
                lines.push(section.title.as_str());
            }
            lines.extend(section.requirements.iter().map(String::as_str));
        }
        lines.join("\n")
    }
}

/// Turns raw file bytes into sections.
pub trait SectionExtractor {
    fn extract_sections(&self, bytes: &[u8]) -> Result<Vec<DocumentSection>, ExtractionError>;
}

/// One untitled section holding every non-empty line of `text`.
pub fn untitled_section(text: &str) -> Vec<DocumentSection> {
    let requirements: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if requirements.is_empty() {
        return Vec::new();
    }
    vec![DocumentSection {
        title: String::new(),
        requirements,
    }]
}
