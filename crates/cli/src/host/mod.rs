//! Host adapters backing a pass when running outside an IDE.

pub mod manifest;
pub mod source_search;

pub use manifest::{BuildManifest, MANIFEST_FILE_NAMES, ModuleManifest};
pub use source_search::SourceTypeSearch;
