//! enhancer-runner-core - Post-compile persistence enhancement for multi-module builds
//!
//! This crate provides functionality to:
//! - Find declarative metadata files and annotated classes in compiled module output
//! - Track them as processing units for incremental builds
//! - Run the bytecode enhancer once per module inside a disposable, module-scoped boundary
//! - Contain failures to the module they happen in
pub mod bridge;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod grouping;
pub mod host;
pub mod orchestrator;
pub mod parser;
pub mod processing;
pub mod scanner;
pub mod sink;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use bridge::{EnhancerProxy, Launcher, ProcessLauncher};
pub use config::{Configuration, PersistedConfig, Resolved};
pub use enhancer::{EnhancerDescriptor, EnhancerRegistry, PersistenceApi};
pub use grouping::ModuleGrouper;
pub use host::{BuildScope, CancelFlag, ModuleRef, Progress, TypeSearch};
pub use orchestrator::{Orchestrator, PassMode, PassReport};
pub use parser::MetadataParser;
pub use processing::{ProcessingUnitRegistry, ValidityCache};
pub use scanner::MetadataScanner;
pub use sink::{CollectingSink, MessageLevel, MessageSink, TracingSink};
