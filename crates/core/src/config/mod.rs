//! Configuration management for enhancer-runner

pub mod extensions;
pub mod resolved;
mod settings;

// Re-export main types
pub use extensions::MetadataExtensions;
pub use resolved::{ConfigWarning, Configuration, EnhancerOptions, LauncherSettings, Resolved};
pub use settings::{CONFIG_FILE_NAMES, LauncherConfig, PersistedConfig};
