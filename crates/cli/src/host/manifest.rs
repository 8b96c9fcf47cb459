//! Build manifest: the module graph and classpaths of a project, as a file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use enhancer_runner_core::{BuildScope, Error, ModuleRef, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const MANIFEST_FILE_NAMES: [&str; 2] = ["enhancer-build.json", "enhancer-build.toml"];

/// One module entry. Paths are relative to the manifest unless absolute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ModuleManifest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_output: Option<PathBuf>,
    pub source_roots: Vec<PathBuf>,
    pub test_source_roots: Vec<PathBuf>,
    pub metadata_roots: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct BuildManifest {
    pub modules: Vec<ModuleManifest>,
    /// Modules touched by the current build. All modules when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<Vec<String>>,
    #[serde(skip)]
    root: PathBuf,
}

impl BuildManifest {
    /// Reads a `.json` or `.toml` manifest. Relative paths resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");

        let mut manifest: BuildManifest = if is_toml {
            toml::from_str(&contents)
                .map_err(|e| Error::ManifestError(format!("{}: {e}", path.display())))?
        } else {
            serde_json::from_str(&contents)
                .map_err(|e| Error::ManifestError(format!("{}: {e}", path.display())))?
        };
        manifest.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        manifest.validate()?;

        debug!(
            "Loaded manifest {} with {} modules",
            path.display(),
            manifest.modules.len()
        );
        Ok(manifest)
    }

    /// Walks up from `start_path` to the first directory holding a manifest.
    pub fn find(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;
        loop {
            for name in MANIFEST_FILE_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            current = current.parent()?;
        }
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module(&self, name: &str) -> Option<&ModuleManifest> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn module_refs(&self) -> Vec<ModuleRef> {
        self.modules.iter().map(|m| ModuleRef::new(&m.name)).collect()
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn source_roots(&self, module: &ModuleRef, include_tests: bool) -> Vec<PathBuf> {
        let Some(entry) = self.module(module.name()) else {
            return Vec::new();
        };
        let tests = if include_tests {
            entry.test_source_roots.as_slice()
        } else {
            &[]
        };
        entry
            .source_roots
            .iter()
            .chain(tests)
            .map(|p| self.resolve(p))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            let name = module.name.trim();
            if name.is_empty() {
                return Err(Error::ManifestError("module without a name".to_string()));
            }
            if !seen.insert(name) {
                return Err(Error::ManifestError(format!("duplicate module: {name}")));
            }
        }
        Ok(())
    }
}

impl BuildScope for BuildManifest {
    fn affected_modules(&self) -> Vec<ModuleRef> {
        let Some(affected) = &self.affected else {
            return self.module_refs();
        };
        affected
            .iter()
            .filter(|name| {
                let known = self.module(name).is_some();
                if !known {
                    warn!("Ignoring unknown affected module {}", name);
                }
                known
            })
            .map(ModuleRef::new)
            .collect()
    }

    fn output_directory(&self, module: &ModuleRef, tests: bool) -> Option<PathBuf> {
        let entry = self.module(module.name())?;
        let output = if tests {
            entry.test_output.as_ref()
        } else {
            entry.output.as_ref()
        };
        output.map(|p| self.resolve(p))
    }

    fn library_classpath(&self, module: &ModuleRef) -> Vec<PathBuf> {
        self.module(module.name())
            .map(|m| m.libraries.iter().map(|p| self.resolve(p)).collect())
            .unwrap_or_default()
    }

    fn metadata_search_paths(&self, module: &ModuleRef) -> Vec<PathBuf> {
        self.module(module.name())
            .map(|m| m.metadata_roots.iter().map(|p| self.resolve(p)).collect())
            .unwrap_or_default()
    }
}
