use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use super::metadata_scanner::MetadataScanner;
use crate::config::Configuration;
use crate::error::Error;
use crate::host::{BuildScope, ModuleRef, TypeSearch};
use crate::parser::MetadataParser;
use crate::types::MetadataUnit;

/// Result of scanning the enabled modules of one pass.
#[derive(Debug, Default)]
pub struct Discovery {
    pub units: Vec<MetadataUnit>,
    /// Metadata files that could not be read or parsed, and failed type searches.
    /// Neither contributes to `units`.
    pub failures: Vec<Error>,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units_for<'a>(&'a self, module: &'a ModuleRef) -> impl Iterator<Item = &'a MetadataUnit> {
        self.units.iter().filter(move |unit| unit.module() == module)
    }
}

/// Compiled output directories of `module`, main first. Test output is only
/// included when the configuration asks for it.
pub fn output_dirs(scope: &dyn BuildScope, module: &ModuleRef, include_tests: bool) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(2);
    if let Some(main) = scope.output_directory(module, false) {
        dirs.push(main);
    }
    if include_tests {
        if let Some(test) = scope.output_directory(module, true) {
            if !dirs.contains(&test) {
                dirs.push(test);
            }
        }
    }
    dirs
}

/// Scans every enabled module among `modules`: declarative files first, then
/// annotated types that no metadata file already declares.
pub fn discover(
    scope: &dyn BuildScope,
    search: &dyn TypeSearch,
    config: &Configuration,
    modules: &[ModuleRef],
) -> Discovery {
    let scanner = MetadataScanner::new(&config.metadata_extensions);
    let annotations = config.descriptor().annotation_names();
    let mut discovery = Discovery::default();

    for module in modules.iter().filter(|m| config.is_module_enabled(m)) {
        let dirs = output_dirs(scope, module, config.include_test_classes);
        if dirs.is_empty() {
            debug!("Module {} has no output directory, nothing to scan", module);
            continue;
        }

        let mut declared: HashSet<String> = HashSet::new();
        let mut seen_files: HashSet<PathBuf> = HashSet::new();
        let roots = dirs
            .iter()
            .cloned()
            .chain(scope.metadata_search_paths(module));

        for root in roots {
            for file in scanner.find_metadata_files(&root) {
                if !seen_files.insert(file.clone()) {
                    continue;
                }
                match MetadataParser::parse_file(&file) {
                    Ok(names) => {
                        if let Some(unit) = MetadataUnit::declarative(
                            module.clone(),
                            file,
                            root.clone(),
                            names,
                            &dirs,
                        ) {
                            declared.extend(unit.class_names().iter().cloned());
                            discovery.units.push(unit);
                        }
                    }
                    Err(e) => discovery.failures.push(e),
                }
            }
        }

        let (marked, failures) = MetadataScanner::find_marked_types(search, module, &annotations);
        discovery.failures.extend(failures);
        for class_name in marked {
            if declared.contains(&class_name) || !config.is_file_enabled(&class_name) {
                continue;
            }
            if let Some(unit) = MetadataUnit::annotated(module.clone(), class_name, &dirs) {
                discovery.units.push(unit);
            }
        }

        info!(
            "Module {}: {} metadata units",
            module,
            discovery.units_for(module).count()
        );
    }

    discovery
}
