pub mod metadata_unit;
pub mod plan;
pub mod processing_unit;

// Re-export commonly used types
pub use metadata_unit::{MetadataUnit, class_file_path, is_valid_class_name, resolve_class_file};
pub use plan::ModuleEnhancementPlan;
pub use processing_unit::{Fingerprint, ProcessingUnit, TargetKind};
