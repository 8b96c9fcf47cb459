use anyhow::{Context, Result};
use enhancer_runner_core::ValidityCache;

use crate::project::ProjectPaths;

pub fn clean_command(paths: &ProjectPaths) -> Result<()> {
    let cache_dir = paths.load_config()?.cache_dir();
    if !cache_dir.exists() {
        println!("No incremental state at {}", cache_dir.display());
        return Ok(());
    }

    let mut cache = ValidityCache::open(cache_dir.clone())
        .with_context(|| format!("Failed to read {}", cache_dir.display()))?;
    let entries = cache.len();
    cache
        .clear()
        .with_context(|| format!("Failed to remove {}", cache_dir.display()))?;
    println!("🧹 Removed {entries} cache entries from {}", cache_dir.display());
    Ok(())
}
