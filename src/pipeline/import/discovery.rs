use std::path::{Path, PathBuf};

use super::format::FileCategory;
use super::ImportError;

/// A document selected for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// File stem; used as the sheet label and default target feature.
    pub display_name: String,
    pub category: FileCategory,
}

/// List the supported documents in `docs_dir`, sorted by file name.
///
/// Subdirectories are not descended into. Only the extension is looked at
/// here; a file whose content does not match it fails on its own during
/// extraction and shows up in the run report.
pub fn discover_documents(docs_dir: &Path) -> Result<Vec<SourceDocument>, ImportError> {
    if !docs_dir.is_dir() {
        return Err(ImportError::DocsDirMissing(docs_dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(docs_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && FileCategory::from_extension(p).is_supported())
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let documents: Vec<SourceDocument> = paths
        .into_iter()
        .map(|path| {
            let category = FileCategory::from_extension(&path);
            let display_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            SourceDocument {
                path,
                display_name,
                category,
            }
        })
        .collect();

    if documents.is_empty() {
        return Err(ImportError::NoSupportedFiles(docs_dir.to_path_buf()));
    }

    tracing::info!(
        dir = %docs_dir.display(),
        count = documents.len(),
        "Documents discovered"
    );
    Ok(documents)
}
