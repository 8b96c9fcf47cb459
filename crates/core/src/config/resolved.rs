//! Validated configuration snapshot used by a build pass.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::extensions::MetadataExtensions;
use super::settings::{LauncherConfig, PersistedConfig};
use crate::enhancer::{EnhancerDescriptor, EnhancerRegistry, PersistenceApi};
use crate::error::Result;
use crate::host::ModuleRef;

/// Toggles pushed into the enhancer's own option model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhancerOptions {
    pub add_default_constructor: bool,
    pub enforce_property_restrictions: bool,
    pub use_temporary_loader: bool,
}

impl Default for EnhancerOptions {
    fn default() -> Self {
        Self {
            add_default_constructor: true,
            enforce_property_restrictions: true,
            use_temporary_loader: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LauncherSettings {
    pub java: PathBuf,
    pub jvm_args: Vec<String>,
    pub runtime_classpath: Vec<PathBuf>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jvm_args: Vec::new(),
            runtime_classpath: Vec::new(),
        }
    }
}

impl From<&LauncherConfig> for LauncherSettings {
    fn from(config: &LauncherConfig) -> Self {
        Self {
            java: config.java.clone().unwrap_or_else(|| PathBuf::from("java")),
            jvm_args: config.jvm_args.clone(),
            runtime_classpath: config.runtime_classpath.clone(),
        }
    }
}

/// A stored setting that was replaced while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownEnhancer {
        requested: String,
        fallback: String,
    },
    UnsupportedApi {
        requested: String,
        enhancer: String,
        fallback: PersistenceApi,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownEnhancer {
                requested,
                fallback,
            } => write!(
                f,
                "Settings Error: Reverted enhancer support from {requested} to {fallback}. Please reset the configuration."
            ),
            ConfigWarning::UnsupportedApi {
                requested,
                enhancer,
                fallback,
            } => write!(
                f,
                "Settings Error: Reverted enhancer api from {requested} to {fallback} ({enhancer} does not support {requested}). Please reset the configuration."
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Configuration,
    pub warnings: Vec<ConfigWarning>,
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub enabled: bool,
    pub metadata_extensions: Vec<String>,
    pub include_test_classes: bool,
    pub enabled_modules: BTreeSet<String>,
    pub enabled_files: BTreeSet<String>,
    pub options: EnhancerOptions,
    pub launcher: LauncherSettings,
    pub cache_dir: Option<PathBuf>,
    descriptor: Arc<EnhancerDescriptor>,
    api: PersistenceApi,
}

impl Configuration {
    /// Validates a stored configuration against the registry. The selected API is
    /// coerced to the descriptor's default when it is unknown or unsupported.
    pub fn resolve(persisted: &PersistedConfig, registry: &EnhancerRegistry) -> Resolved {
        let mut warnings = Vec::new();

        let descriptor = match persisted.enhancer.as_deref().map(str::trim) {
            None | Some("") => registry.default_descriptor(),
            Some(id) => match registry.get(id) {
                Some(descriptor) => descriptor,
                None => {
                    let fallback = registry.default_descriptor();
                    warnings.push(ConfigWarning::UnknownEnhancer {
                        requested: id.to_string(),
                        fallback: fallback.id().to_string(),
                    });
                    fallback
                }
            },
        };

        let requested = persisted
            .api
            .as_deref()
            .map(str::trim)
            .filter(|api| !api.is_empty())
            .unwrap_or(PersistenceApi::Jpa.name());
        let api = match requested.parse::<PersistenceApi>() {
            Ok(api) if descriptor.is_supported(api) => api,
            _ => {
                let fallback = descriptor.default_api();
                warnings.push(ConfigWarning::UnsupportedApi {
                    requested: requested.to_string(),
                    enhancer: descriptor.name().to_string(),
                    fallback,
                });
                fallback
            }
        };

        let config = Configuration {
            enabled: persisted.enabled,
            metadata_extensions: persisted.metadata_extensions.to_list(),
            include_test_classes: persisted.include_test_classes,
            enabled_modules: collect_names(&persisted.enabled_modules),
            enabled_files: collect_names(&persisted.enabled_files),
            options: EnhancerOptions {
                add_default_constructor: persisted.add_default_constructor,
                enforce_property_restrictions: persisted.enforce_property_restrictions,
                use_temporary_loader: persisted.tmp_class_loader,
            },
            launcher: persisted
                .launcher
                .as_ref()
                .map(LauncherSettings::from)
                .unwrap_or_default(),
            cache_dir: persisted.cache_dir.clone(),
            descriptor,
            api,
        };

        Resolved { config, warnings }
    }

    pub fn load(path: &Path, registry: &EnhancerRegistry) -> Result<Resolved> {
        let persisted = PersistedConfig::load_from_file(path)?;
        Ok(Self::resolve(&persisted, registry))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_persisted().save_to_file(path)
    }

    pub fn to_persisted(&self) -> PersistedConfig {
        let launcher = if self.launcher == LauncherSettings::default() {
            None
        } else {
            Some(LauncherConfig {
                java: Some(self.launcher.java.clone()),
                jvm_args: self.launcher.jvm_args.clone(),
                runtime_classpath: self.launcher.runtime_classpath.clone(),
            })
        };

        PersistedConfig {
            enabled: self.enabled,
            metadata_extensions: MetadataExtensions::List(self.metadata_extensions.clone()),
            include_test_classes: self.include_test_classes,
            enabled_modules: self.enabled_modules.iter().cloned().collect(),
            enabled_files: self.enabled_files.iter().cloned().collect(),
            api: Some(self.api.name().to_string()),
            enhancer: Some(self.descriptor.id().to_string()),
            add_default_constructor: self.options.add_default_constructor,
            enforce_property_restrictions: self.options.enforce_property_restrictions,
            tmp_class_loader: self.options.use_temporary_loader,
            launcher,
            cache_dir: self.cache_dir.clone(),
        }
    }

    pub fn descriptor(&self) -> &Arc<EnhancerDescriptor> {
        &self.descriptor
    }

    pub fn api(&self) -> PersistenceApi {
        self.api
    }

    /// Selects an enhancer and API together, coercing the API like a load does.
    pub fn select(
        &mut self,
        descriptor: Arc<EnhancerDescriptor>,
        api: PersistenceApi,
    ) -> Option<ConfigWarning> {
        let warning = if descriptor.is_supported(api) {
            self.api = api;
            None
        } else {
            self.api = descriptor.default_api();
            Some(ConfigWarning::UnsupportedApi {
                requested: api.name().to_string(),
                enhancer: descriptor.name().to_string(),
                fallback: self.api,
            })
        };
        self.descriptor = descriptor;
        warning
    }

    /// Enabled and at least one module switched on.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.enabled_modules.is_empty()
    }

    pub fn is_module_enabled(&self, module: &ModuleRef) -> bool {
        self.enabled_modules.contains(module.name())
    }

    /// Whether an annotated type passes the enabled-files filter. An empty filter
    /// admits everything.
    pub fn is_file_enabled(&self, class_name: &str) -> bool {
        self.enabled_files.is_empty() || self.enabled_files.contains(class_name)
    }

    /// Drops enabled module names that are not among `supported`.
    pub fn retain_supported_modules(&mut self, supported: &[ModuleRef]) {
        self.enabled_modules
            .retain(|name| supported.iter().any(|module| module.name() == name));
    }

    /// Drops enabled annotated-type names that are no longer discovered.
    pub fn retain_known_files(&mut self, known: &[String]) {
        self.enabled_files.retain(|name| known.contains(name));
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::resolve(&PersistedConfig::default(), &EnhancerRegistry::new()).config
    }
}

fn collect_names(names: &[String]) -> BTreeSet<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::Bindings;
    use tempfile::TempDir;

    fn registry_with_hibernate_only() -> EnhancerRegistry {
        let mut registry = EnhancerRegistry::new();
        registry.register(Arc::new(EnhancerDescriptor::new(
            "HIB",
            "HibernateOnly",
            vec![PersistenceApi::Hibernate],
            vec![],
            Bindings::new(),
        )));
        registry
    }

    #[test]
    fn test_defaults_resolve_without_warnings() {
        let resolved = Configuration::resolve(&PersistedConfig::default(), &EnhancerRegistry::new());
        assert!(resolved.warnings.is_empty());
        assert_eq!(resolved.config.api(), PersistenceApi::Jpa);
        assert_eq!(resolved.config.descriptor().id(), "OPENJPA");
        assert!(!resolved.config.is_active());
    }

    #[test]
    fn test_unsupported_api_is_coerced_with_one_warning() {
        let persisted = PersistedConfig {
            enhancer: Some("HIB".to_string()),
            api: Some("JPA".to_string()),
            ..Default::default()
        };
        let resolved = Configuration::resolve(&persisted, &registry_with_hibernate_only());

        assert_eq!(resolved.config.api(), PersistenceApi::Hibernate);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(matches!(
            resolved.warnings[0],
            ConfigWarning::UnsupportedApi {
                fallback: PersistenceApi::Hibernate,
                ..
            }
        ));
    }

    #[test]
    fn test_unparseable_api_falls_back_to_default() {
        let persisted = PersistedConfig {
            api: Some("JDO".to_string()),
            ..Default::default()
        };
        let resolved = Configuration::resolve(&persisted, &EnhancerRegistry::new());
        assert_eq!(resolved.config.api(), PersistenceApi::Jpa);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_enhancer_reverts_to_default() {
        let persisted = PersistedConfig {
            enhancer: Some("DATANUCLEUS".to_string()),
            ..Default::default()
        };
        let resolved = Configuration::resolve(&persisted, &EnhancerRegistry::new());
        assert_eq!(resolved.config.descriptor().id(), "OPENJPA");
        assert_eq!(
            resolved.warnings,
            vec![ConfigWarning::UnknownEnhancer {
                requested: "DATANUCLEUS".to_string(),
                fallback: "OPENJPA".to_string(),
            }]
        );
    }

    #[test]
    fn test_round_trip_reapplies_coercion() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(".enhancer-runner.json");
        let registry = registry_with_hibernate_only();

        PersistedConfig {
            enhancer: Some("HIB".to_string()),
            api: Some("JPA".to_string()),
            enabled_modules: vec!["core".to_string(), " ".to_string()],
            tmp_class_loader: false,
            ..Default::default()
        }
        .save_to_file(&path)?;

        let first = Configuration::load(&path, &registry)?;
        assert_eq!(first.warnings.len(), 1);
        first.config.save(&path)?;

        let second = Configuration::load(&path, &registry)?;
        assert!(second.warnings.is_empty());
        assert_eq!(second.config.api(), PersistenceApi::Hibernate);
        assert_eq!(second.config.enabled_modules.len(), 1);
        assert!(!second.config.options.use_temporary_loader);
        assert_eq!(second.config.to_persisted(), first.config.to_persisted());
        Ok(())
    }

    #[test]
    fn test_select_coerces_unsupported_api() {
        let registry = registry_with_hibernate_only();
        let mut config = Configuration::default();
        let hib = registry.get("HIB").unwrap();

        let warning = config.select(hib, PersistenceApi::Jpa);
        assert!(warning.is_some());
        assert_eq!(config.api(), PersistenceApi::Hibernate);
        assert_eq!(config.descriptor().id(), "HIB");
    }

    #[test]
    fn test_retain_supported_modules() {
        let mut config = Configuration::default();
        config.enabled_modules = ["core", "gone"].iter().map(|s| s.to_string()).collect();
        config.retain_supported_modules(&[ModuleRef::new("core"), ModuleRef::new("web")]);
        assert_eq!(
            config.enabled_modules.iter().collect::<Vec<_>>(),
            vec!["core"]
        );
    }

    #[test]
    fn test_file_filter() {
        let mut config = Configuration::default();
        assert!(config.is_file_enabled("a.B"));
        config.enabled_files.insert("a.B".to_string());
        assert!(config.is_file_enabled("a.B"));
        assert!(!config.is_file_enabled("a.C"));
        config.retain_known_files(&["x.Y".to_string()]);
        assert!(config.enabled_files.is_empty());
    }
}
