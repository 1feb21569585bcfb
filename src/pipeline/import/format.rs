use std::path::Path;

use serde::{Deserialize, Serialize};

/// Document formats the pipeline reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileCategory {
    Docx,
    Pdf,
    PlainText,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Category claimed by the file extension (case-insensitive).
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("docx") => Self::Docx,
            Some("pdf") => Self::Pdf,
            Some("txt") => Self::PlainText,
            _ => Self::Unsupported,
        }
    }
}

/// Confirm the claimed category against the leading bytes of the file.
///
/// `.pdf` must start with `%PDF`, `.docx` with a zip local header (`PK\x03\x04`),
/// `.txt` must be valid UTF-8 in its first chunk (empty counts as text).
pub fn content_matches(claimed: FileCategory, bytes: &[u8]) -> bool {
    match claimed {
        FileCategory::Pdf => bytes.starts_with(b"%PDF"),
        FileCategory::Docx => bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        FileCategory::PlainText => is_likely_text(bytes),
        FileCategory::Unsupported => false,
    }
}

const TEXT_PROBE_BYTES: usize = 4096;

/// A multi-byte character cut at the probe boundary is tolerated.
fn is_likely_text(bytes: &[u8]) -> bool {
    let probe = &bytes[..bytes.len().min(TEXT_PROBE_BYTES)];
    match std::str::from_utf8(probe) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && probe.len() == TEXT_PROBE_BYTES,
    }
}
