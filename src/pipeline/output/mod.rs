pub mod sheet_name;
pub mod writer;

pub use sheet_name::*;
pub use writer::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot create output directory {}: {}", .path.display(), .source)]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),
}
