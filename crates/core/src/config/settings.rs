use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::extensions::MetadataExtensions;

pub const CONFIG_FILE_NAMES: [&str; 2] = [".enhancer-runner.json", "enhancer-runner.json"];

/// Stored form of the configuration. Ids and API names are plain strings here;
/// [`super::Configuration::resolve`] validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PersistedConfig {
    pub enabled: bool,
    pub metadata_extensions: MetadataExtensions,
    pub include_test_classes: bool,
    pub enabled_modules: Vec<String>,
    pub enabled_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancer: Option<String>,
    pub add_default_constructor: bool,
    pub enforce_property_restrictions: bool,
    pub tmp_class_loader: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launcher: Option<LauncherConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

/// How the enhancer process is started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct LauncherConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jvm_args: Vec<String>,
    /// Entries every boundary gets in addition to the module's own classpath.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runtime_classpath: Vec<PathBuf>,
}

impl Default for PersistedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metadata_extensions: MetadataExtensions::default(),
            include_test_classes: true,
            enabled_modules: Vec::new(),
            enabled_files: Vec::new(),
            api: Some("JPA".to_string()),
            enhancer: Some("OPENJPA".to_string()),
            add_default_constructor: true,
            enforce_property_restrictions: true,
            tmp_class_loader: true,
            launcher: None,
            cache_dir: None,
        }
    }
}

impl PersistedConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }
}
