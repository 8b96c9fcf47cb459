use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::host::ModuleRef;
use crate::types::{MetadataUnit, ProcessingUnit};

/// Tracked processing units of one pass, unique per (module, target file).
#[derive(Debug, Default)]
pub struct ProcessingUnitRegistry {
    units: Vec<ProcessingUnit>,
    seen: HashSet<(ModuleRef, PathBuf)>,
}

impl ProcessingUnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a MetadataUnit>) -> Self {
        let mut registry = Self::new();
        for unit in units {
            registry.register(unit);
        }
        registry
    }

    /// Projects `unit` into processing units: the metadata file itself unless the
    /// unit is annotation based, then one per resolved class file. Returns how
    /// many were new.
    pub fn register(&mut self, unit: &MetadataUnit) -> usize {
        let module = unit.module();
        let mut added = 0;

        if !unit.is_annotation_based_only() {
            let target = unit.file().to_path_buf();
            if self.insert(ProcessingUnit::metadata_file(module.clone(), target)) {
                added += 1;
            }
        }

        for (class_name, class_file) in unit.resolved_classes() {
            let processing_unit = ProcessingUnit::class_file(
                module.clone(),
                class_file.to_path_buf(),
                class_name.to_string(),
                unit.is_annotation_based_only(),
            );
            if self.insert(processing_unit) {
                added += 1;
            }
        }

        added
    }

    fn insert(&mut self, unit: ProcessingUnit) -> bool {
        let key = (unit.module.clone(), unit.target.clone());
        if self.seen.insert(key) {
            self.units.push(unit);
            true
        } else {
            debug!("Duplicate processing unit {}", unit.target.display());
            false
        }
    }

    pub fn units(&self) -> &[ProcessingUnit] {
        &self.units
    }

    pub fn for_module<'a>(&'a self, module: &'a ModuleRef) -> impl Iterator<Item = &'a ProcessingUnit> {
        self.units.iter().filter(move |unit| &unit.module == module)
    }

    pub fn has_module(&self, module: &ModuleRef) -> bool {
        self.units.iter().any(|unit| &unit.module == module)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetKind;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_declarative_unit_projects_file_and_classes() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().to_path_buf();
        touch(&out.join("a/b/Foo.class"));
        let unit = MetadataUnit::declarative(
            ModuleRef::new("core"),
            out.join("a/b/Foo.orm"),
            out.clone(),
            vec!["a.b.Foo".to_string(), "a.b.Missing".to_string()],
            &[out.clone()],
        )
        .unwrap();

        let registry = ProcessingUnitRegistry::from_units([&unit]);
        let units = registry.units();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, TargetKind::MetadataFile);
        assert_eq!(units[0].target, out.join("a/b/Foo.orm"));
        assert_eq!(units[1].kind, TargetKind::ClassFile);
        assert_eq!(units[1].target, out.join("a/b/Foo.class"));
        assert_eq!(units[1].class_name.as_deref(), Some("a.b.Foo"));
    }

    #[test]
    fn test_duplicate_targets_are_kept_once() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().to_path_buf();
        touch(&out.join("a/Foo.class"));
        let module = ModuleRef::new("core");

        let first = MetadataUnit::declarative(
            module.clone(),
            out.join("one.orm"),
            out.clone(),
            vec!["a.Foo".to_string()],
            &[out.clone()],
        )
        .unwrap();
        let second = MetadataUnit::declarative(
            module.clone(),
            out.join("two.orm"),
            out.clone(),
            vec!["a.Foo".to_string()],
            &[out.clone()],
        )
        .unwrap();
        let annotated = MetadataUnit::annotated(module.clone(), "a.Foo".to_string(), &[out.clone()]).unwrap();

        let mut registry = ProcessingUnitRegistry::new();
        assert_eq!(registry.register(&first), 2);
        assert_eq!(registry.register(&second), 1);
        assert_eq!(registry.register(&annotated), 0);
        assert_eq!(registry.register(&first), 0);
        assert_eq!(registry.len(), 3);
        assert!(registry.has_module(&module));
        assert!(!registry.has_module(&ModuleRef::new("web")));
    }

    #[test]
    fn test_annotated_unit_yields_single_class_unit() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().to_path_buf();
        touch(&out.join("c/D.class"));
        let unit = MetadataUnit::annotated(ModuleRef::new("core"), "c.D".to_string(), &[out.clone()]).unwrap();

        let registry = ProcessingUnitRegistry::from_units([&unit]);
        assert_eq!(registry.len(), 1);
        assert!(registry.units()[0].annotation_based);
        assert_eq!(registry.units()[0].target, out.join("c/D.class"));
    }
}
