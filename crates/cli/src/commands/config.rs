use anyhow::{Context, Result};

use crate::display::format_message;
use crate::project::ProjectPaths;
use enhancer_runner_core::MessageLevel;

/// Prints the resolved configuration as it would be stored, then any
/// setting that was reverted while loading.
pub fn config_command(paths: &ProjectPaths) -> Result<()> {
    let loaded = paths.load_config()?;
    let exists = loaded.path.is_file();

    println!(
        "📄 {}{}",
        loaded.path.display(),
        if exists { "" } else { " (not created yet, showing defaults)" }
    );
    let json = serde_json::to_string_pretty(&loaded.config.to_persisted())
        .context("Failed to render configuration")?;
    println!("{json}");
    println!("Cache directory: {}", loaded.cache_dir().display());

    for warning in &loaded.warnings {
        println!("{}", format_message(MessageLevel::Warning, &warning.to_string()));
    }
    Ok(())
}
