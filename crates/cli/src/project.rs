//! Locating and loading the manifest and configuration of a project.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use enhancer_runner_core::config::{CONFIG_FILE_NAMES, ConfigWarning};
use enhancer_runner_core::enhancer::registry;
use enhancer_runner_core::{Configuration, PersistedConfig};
use tracing::debug;

use crate::host::{BuildManifest, MANIFEST_FILE_NAMES};

/// Incremental state lives here unless the configuration names a directory.
pub const DEFAULT_CACHE_DIR: &str = ".enhancer-runner-cache";

/// Paths given on the command line; unset ones are discovered from `project`.
#[derive(Debug, Clone, Default)]
pub struct ProjectPaths {
    pub project: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl ProjectPaths {
    pub fn root(&self) -> Result<PathBuf> {
        match &self.project {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to get current directory"),
        }
    }

    /// The explicit config path, the first one found walking up, or the
    /// default location in the project root.
    pub fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            return Ok(path.clone());
        }
        let root = self.root()?;
        Ok(PersistedConfig::find_config_file(&root)
            .unwrap_or_else(|| root.join(CONFIG_FILE_NAMES[0])))
    }

    pub fn manifest_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.manifest {
            return Ok(path.clone());
        }
        let root = self.root()?;
        match BuildManifest::find(&root) {
            Some(path) => Ok(path),
            None => bail!(
                "No build manifest ({}) found in {} or its parents",
                MANIFEST_FILE_NAMES.join(" or "),
                root.display()
            ),
        }
    }

    pub fn load_manifest(&self) -> Result<BuildManifest> {
        let path = self.manifest_path()?;
        BuildManifest::load(&path)
            .with_context(|| format!("Failed to load build manifest {}", path.display()))
    }

    /// Loads the configuration, falling back to defaults when no file exists.
    /// Relative cache directories resolve against the config file.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let path = self.config_path()?;
        let registry = registry::snapshot();

        let (mut config, warnings) = if path.is_file() {
            let resolved = Configuration::load(&path, &registry)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            (resolved.config, resolved.warnings)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            (Configuration::default(), Vec::new())
        };

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.cache_dir = Some(match config.cache_dir.take() {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base.join(dir),
            None => base.join(DEFAULT_CACHE_DIR),
        });

        Ok(LoadedConfig {
            path,
            config,
            warnings,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Configuration,
    pub warnings: Vec<ConfigWarning>,
}

impl LoadedConfig {
    /// Writes the configuration back, keeping a defaulted cache directory implicit.
    pub fn save(&self) -> Result<()> {
        let mut persisted = self.config.to_persisted();
        let base = self.path.parent().unwrap_or(Path::new(""));
        if persisted.cache_dir.as_deref() == Some(base.join(DEFAULT_CACHE_DIR).as_path()) {
            persisted.cache_dir = None;
        }
        persisted
            .save_to_file(&self.path)
            .with_context(|| format!("Failed to write configuration {}", self.path.display()))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.config.cache_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }
}
