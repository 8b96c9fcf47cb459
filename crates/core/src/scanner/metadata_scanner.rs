use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Error;
use crate::host::{ModuleRef, TypeSearch};

/// Finds declarative metadata files by extension and annotated types through the
/// host's type search. Read-only.
#[derive(Debug, Clone, Default)]
pub struct MetadataScanner {
    extensions: Vec<String>,
}

impl MetadataScanner {
    /// An empty extension list turns declarative discovery off.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for extension in extensions {
            let extension = extension.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !extension.is_empty() && !normalized.contains(&extension) {
                normalized.push(extension);
            }
        }
        Self {
            extensions: normalized,
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_declarative_enabled(&self) -> bool {
        !self.extensions.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Metadata files below `root`, in file-name order. Unreadable entries are skipped.
    pub fn find_metadata_files(&self, root: &Path) -> Vec<PathBuf> {
        if !self.is_declarative_enabled() || !root.is_dir() {
            return Vec::new();
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
        {
            if entry.file_type().is_file() && self.matches(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!("Found {} metadata files under {}", files.len(), root.display());
        files
    }

    /// Types of `module` carrying any of `annotations`, unioned in query order,
    /// and the queries that failed. A failing query contributes no types.
    pub fn find_marked_types(
        search: &dyn TypeSearch,
        module: &ModuleRef,
        annotations: &[String],
    ) -> (Vec<String>, Vec<Error>) {
        let mut types: Vec<String> = Vec::new();
        let mut failures = Vec::new();
        for annotation in annotations {
            match search.find_annotated_types(module, annotation) {
                Ok(found) => {
                    for name in found {
                        if !types.contains(&name) {
                            types.push(name);
                        }
                    }
                }
                Err(e) => {
                    debug!("Type search for @{} failed in module {}: {}", annotation, module, e);
                    failures.push(Error::TypeSearch {
                        module: module.name().to_string(),
                        annotation: annotation.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        (types, failures)
    }
}
