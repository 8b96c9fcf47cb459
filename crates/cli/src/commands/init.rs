use anyhow::Result;
use enhancer_runner_core::Configuration;
use tracing::info;

use super::modules::supported_modules;
use crate::project::{LoadedConfig, ProjectPaths};

/// Writes a default configuration enabling every module that can be enhanced.
pub fn init_command(paths: &ProjectPaths, force: bool) -> Result<()> {
    let config_path = paths.config_path()?;
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    let manifest = paths.load_manifest()?;
    let mut config = Configuration::default();
    let supported = supported_modules(&manifest, &config);
    config.enabled_modules = manifest.modules.iter().map(|m| m.name.clone()).collect();
    config.retain_supported_modules(&supported);
    info!("{} of {} modules carry the enhancer", supported.len(), manifest.modules.len());

    let loaded = LoadedConfig {
        path: config_path,
        config,
        warnings: Vec::new(),
    };
    loaded.save()?;

    println!("✅ Created config: {}", loaded.path.display());
    if loaded.config.enabled_modules.is_empty() {
        println!("   No module has the enhancer on its classpath; nothing enabled");
    } else {
        for name in &loaded.config.enabled_modules {
            println!("   • enabled {name}");
        }
    }
    Ok(())
}
