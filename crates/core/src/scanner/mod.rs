//! Metadata discovery: file traversal, parsing and unit construction

pub mod discovery;
pub mod metadata_scanner;

pub use discovery::{Discovery, discover};
pub use metadata_scanner::MetadataScanner;
