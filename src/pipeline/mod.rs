pub mod import;
pub mod extraction;
pub mod structuring;
pub mod output;
pub mod diagnostic; // Raw responses and debug dumps
pub mod batch;
