//! Annotation lookup over a module's Java sources.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use enhancer_runner_core::{ModuleRef, Result, TypeSearch};
use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use super::manifest::BuildManifest;

/// What a single source file tells about its top-level type.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceType {
    name: String,
    imports: Vec<String>,
    /// Annotations as written, simple or qualified.
    annotations: Vec<String>,
}

impl SourceType {
    fn is_marked_by(&self, annotation: &str) -> bool {
        let (package, simple) = annotation.rsplit_once('.').unwrap_or(("", annotation));
        self.annotations.iter().any(|used| {
            used == annotation
                || (used == simple
                    && self.imports.iter().any(|import| {
                        import == annotation || import.strip_suffix(".*") == Some(package)
                    }))
        })
    }
}

/// [`TypeSearch`] backed by the `source_roots` of the build manifest. Each
/// module is indexed once, on first use.
pub struct SourceTypeSearch<'a> {
    manifest: &'a BuildManifest,
    include_tests: bool,
    package_re: Regex,
    import_re: Regex,
    annotation_re: Regex,
    index: RefCell<HashMap<ModuleRef, Vec<SourceType>>>,
}

impl<'a> SourceTypeSearch<'a> {
    pub fn new(manifest: &'a BuildManifest, include_tests: bool) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            manifest,
            include_tests,
            package_re: Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;")?,
            import_re: Regex::new(r"(?m)^\s*import\s+([\w.]+(?:\.\*)?)\s*;")?,
            annotation_re: Regex::new(r"@([A-Za-z_][\w.]*)")?,
            index: RefCell::new(HashMap::new()),
        })
    }

    fn parse(&self, path: &Path, source: &str) -> Option<SourceType> {
        let stem = path.file_stem()?.to_str()?;
        let name = match self.package_re.captures(source) {
            Some(caps) => format!("{}.{}", &caps[1], stem),
            None => stem.to_string(),
        };
        Some(SourceType {
            name,
            imports: self
                .import_re
                .captures_iter(source)
                .map(|caps| caps[1].to_string())
                .collect(),
            annotations: self
                .annotation_re
                .captures_iter(source)
                .map(|caps| caps[1].to_string())
                .collect(),
        })
    }

    fn index_module(&self, module: &ModuleRef) -> Vec<SourceType> {
        let mut types = Vec::new();
        for root in self.manifest.source_roots(module, self.include_tests) {
            for entry in WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("java") {
                    continue;
                }
                match std::fs::read_to_string(path) {
                    Ok(source) => types.extend(self.parse(path, &source)),
                    Err(e) => debug!("Skipping unreadable source {}: {}", path.display(), e),
                }
            }
        }
        debug!("Indexed {} source types in module {}", types.len(), module);
        types
    }
}

impl TypeSearch for SourceTypeSearch<'_> {
    fn find_annotated_types(&self, module: &ModuleRef, annotation: &str) -> Result<Vec<String>> {
        let mut index = self.index.borrow_mut();
        let types = index
            .entry(module.clone())
            .or_insert_with(|| self.index_module(module));

        Ok(types
            .iter()
            .filter(|t| t.is_marked_by(annotation))
            .map(|t| t.name.clone())
            .collect())
    }
}
