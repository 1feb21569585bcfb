pub mod format;
pub mod discovery;

pub use format::*;
pub use discovery::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Documents folder not found: {}", .0.display())]
    DocsDirMissing(PathBuf),

    #[error("No supported documents (.docx, .pdf, .txt) in {}", .0.display())]
    NoSupportedFiles(PathBuf),
}
