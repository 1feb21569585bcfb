use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use super::sanitize::sanitize_line;
use super::types::{DocumentSection, SectionExtractor};
use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word documents. A paragraph with a bold run starts a new section and
/// becomes its title; other paragraphs are requirements of the current section.
pub struct DocxExtractor;

impl SectionExtractor for DocxExtractor {
    fn extract_sections(&self, bytes: &[u8]) -> Result<Vec<DocumentSection>, ExtractionError> {
        let xml = read_document_xml(bytes)?;
        let paragraphs = parse_paragraphs(&xml)?;
        Ok(group_sections(paragraphs))
    }
}

/// Text of one `w:p` and whether any of its runs is bold.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Paragraph {
    text: String,
    bold: bool,
}

fn read_document_xml(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Zip(e.to_string()))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Zip(format!("{DOCUMENT_PART}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractionError::EncodingError(e.to_string()))?;
    Ok(xml)
}

/// `w:val="0"` or `w:val="false"` switches a toggle property off.
fn check_val_off(e: &BytesStart) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"w:val" && matches!(attr.value.as_ref(), b"0" | b"false")
    })
}

#[derive(Default)]
struct WalkState {
    paragraphs: Vec<Paragraph>,
    text: String,
    in_paragraph: bool,
    paragraph_bold: bool,
    in_run: bool,
    run_bold: bool,
    run_has_text: bool,
    in_text: bool,
}

impl WalkState {
    fn start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" => {
                self.in_paragraph = true;
                self.paragraph_bold = false;
                self.text.clear();
            }
            b"w:r" => {
                self.in_run = true;
                self.run_bold = false;
                self.run_has_text = false;
            }
            b"w:t" => self.in_text = true,
            _ => self.empty(e),
        }
    }

    fn empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:b" if self.in_run => self.run_bold = !check_val_off(e),
            b"w:tab" | b"w:br" | b"w:cr" if self.in_run => self.text.push(' '),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:r" => {
                if self.run_bold && self.run_has_text {
                    self.paragraph_bold = true;
                }
                self.in_run = false;
            }
            b"w:p" if self.in_paragraph => {
                self.paragraphs.push(Paragraph {
                    text: sanitize_line(&self.text),
                    bold: self.paragraph_bold,
                });
                self.in_paragraph = false;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text {
            self.text.push_str(text);
            if !text.trim().is_empty() {
                self.run_has_text = true;
            }
        }
    }
}

fn parse_paragraphs(xml: &str) -> Result<Vec<Paragraph>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut state = WalkState::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => state.start(&e),
            Ok(Event::Empty(e)) => state.empty(&e),
            Ok(Event::End(e)) => state.end(e.name().as_ref()),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ExtractionError::Xml(err.to_string()))?;
                state.text(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::Xml(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
        buf.clear();
    }
    Ok(state.paragraphs)
}

fn group_sections(paragraphs: Vec<Paragraph>) -> Vec<DocumentSection> {
    let mut sections = Vec::new();
    let mut current = DocumentSection::default();

    for paragraph in paragraphs.into_iter().filter(|p| !p.text.is_empty()) {
        if paragraph.bold {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            current.title = paragraph.text;
        } else {
            current.requirements.push(paragraph.text);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}
