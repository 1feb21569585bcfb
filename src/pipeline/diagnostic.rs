//! Artifacts written next to the run for manual inspection.
//!
//! Every document's raw model response is preserved before parsing, so a
//! document that fails to parse can still be inspected by hand. With `--debug`
//! the prompt and the normalized record are dumped too.
//!
//! **Output structure**:
//! ```text
//! {raw_dir}/
//!   raw_{artifact name}.txt
//!   debug/{artifact name}/
//!     01-prompt.txt
//!     02-normalized-record.json
//! ```
//!
//! The artifact name is the document's display name, suffixed `_1`, `_2`, …
//! when another document in the run already used it.
//!
//! Write failures are logged and never abort the run.

use std::path::{Path, PathBuf};

/// Debug dump subdirectory inside the raw directory.
const DEBUG_SUBDIR: &str = "debug";

/// Bound for per-document artifact names.
pub const ARTIFACT_NAME_MAX_LEN: usize = 120;

pub const PROMPT_DUMP: &str = "01-prompt.txt";
pub const RECORD_DUMP: &str = "02-normalized-record.json";

// ──────────────────────────────────────────────
// Raw responses
// ──────────────────────────────────────────────

/// `<raw_dir>/raw_<name>.txt`. Callers pass a name unique within the run.
pub fn raw_response_path(raw_dir: &Path, name: &str) -> PathBuf {
    raw_dir.join(format!("raw_{name}.txt"))
}

/// Preserve the raw response of one document.
///
/// Returns the artifact path when it was written, `None` (with a warning) otherwise.
pub fn preserve_raw_response(raw_dir: &Path, name: &str, raw: &str) -> Option<PathBuf> {
    if let Err(e) = std::fs::create_dir_all(raw_dir) {
        tracing::warn!(
            path = %raw_dir.display(),
            error = %e,
            "Raw response: failed to create directory"
        );
        return None;
    }

    let path = raw_response_path(raw_dir, name);
    dump_text_at(&path, raw).then_some(path)
}

// ──────────────────────────────────────────────
// Debug dumps
// ──────────────────────────────────────────────

/// Debug dump directory for a document, created on first call.
pub fn debug_dir_for(raw_dir: &Path, name: &str) -> Option<PathBuf> {
    let dir = raw_dir.join(DEBUG_SUBDIR).join(name);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Diagnostic dump: failed to create directory"
        );
        return None;
    }
    Some(dir)
}

/// Write a JSON artifact. Pretty-printed; never panics.
pub fn dump_json<T: serde::Serialize>(dir: &Path, filename: &str, value: &T) {
    let path = dir.join(filename);
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            dump_text_at(&path, &json);
        }
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Diagnostic dump: failed to serialize JSON"
        ),
    }
}

/// Write a text artifact (prompt, response). Never panics.
pub fn dump_text(dir: &Path, filename: &str, text: &str) {
    dump_text_at(&dir.join(filename), text);
}

fn dump_text_at(path: &Path, text: &str) -> bool {
    match std::fs::write(path, text.as_bytes()) {
        Ok(()) => {
            tracing::debug!(
                path = %path.display(),
                size = text.len(),
                "Diagnostic dump: text written"
            );
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Diagnostic dump: failed to write text"
            );
            false
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
