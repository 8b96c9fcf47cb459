use anyhow::Result;

use crate::project::ProjectPaths;

/// Switches the feature flag, or single modules when `modules` is not empty.
pub fn toggle_command(paths: &ProjectPaths, enable: bool, modules: &[String]) -> Result<()> {
    let mut loaded = paths.load_config()?;
    let verb = if enable { "Enabled" } else { "Disabled" };

    if modules.is_empty() {
        loaded.config.enabled = enable;
        loaded.save()?;
        println!("{verb} enhancement ({})", loaded.path.display());
        return Ok(());
    }

    let known = paths.load_manifest().ok();
    for name in modules {
        let name = name.trim();
        if let Some(manifest) = &known {
            if manifest.module(name).is_none() {
                println!("⚠️  Module {name} is not in the build manifest");
            }
        }
        if enable {
            loaded.config.enabled_modules.insert(name.to_string());
        } else {
            loaded.config.enabled_modules.remove(name);
        }
        println!("{verb} module {name}");
    }
    loaded.save()
}
