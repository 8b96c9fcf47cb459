//! Declarative persistence metadata parsing

pub mod metadata_parser;

pub use metadata_parser::MetadataParser;
