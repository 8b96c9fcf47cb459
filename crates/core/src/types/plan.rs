use std::path::{Path, PathBuf};

use super::processing_unit::{ProcessingUnit, TargetKind};
use crate::host::ModuleRef;

/// Everything one module contributes to a pass.
#[derive(Debug, Clone)]
pub struct ModuleEnhancementPlan {
    pub module: ModuleRef,
    pub output_dir: PathBuf,
    pub test_output_dir: Option<PathBuf>,
    /// Metadata files and the classes they declare.
    pub declarative: Vec<ProcessingUnit>,
    /// Annotated classes no metadata file covers.
    pub annotated: Vec<ProcessingUnit>,
}

impl ModuleEnhancementPlan {
    pub fn new(module: ModuleRef, output_dir: PathBuf, test_output_dir: Option<PathBuf>) -> Self {
        Self {
            module,
            output_dir,
            test_output_dir,
            declarative: Vec::new(),
            annotated: Vec::new(),
        }
    }

    pub fn push(&mut self, unit: ProcessingUnit) {
        if unit.annotation_based {
            self.annotated.push(unit);
        } else {
            self.declarative.push(unit);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarative.is_empty() && self.annotated.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &ProcessingUnit> {
        self.declarative.iter().chain(&self.annotated)
    }

    /// Compiled output directories, main first.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.output_dir.clone())
            .chain(self.test_output_dir.clone())
            .collect()
    }

    pub fn metadata_files(&self) -> Vec<&Path> {
        self.declarative
            .iter()
            .filter(|unit| unit.kind == TargetKind::MetadataFile)
            .map(|unit| unit.target.as_path())
            .collect()
    }

    /// Declared types with compiled output, metadata-declared ones first.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.units().filter_map(|unit| unit.class_name.as_deref()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
