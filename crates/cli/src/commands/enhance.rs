use anyhow::{Context, Result};
use enhancer_runner_core::{MessageLevel, MessageSink, Orchestrator, PassMode, ValidityCache};
use tracing::info;

use crate::display::ConsoleSink;
use crate::host::SourceTypeSearch;
use crate::project::ProjectPaths;

pub fn enhance_command(paths: &ProjectPaths, rebuild: bool) -> Result<()> {
    let manifest = paths.load_manifest()?;
    let loaded = paths.load_config()?;
    let sink = ConsoleSink;
    for warning in &loaded.warnings {
        sink.emit(MessageLevel::Warning, &warning.to_string());
    }

    let cache_dir = loaded.cache_dir();
    let validity = ValidityCache::open(cache_dir.clone())
        .with_context(|| format!("Failed to read incremental state in {}", cache_dir.display()))?;
    let search = SourceTypeSearch::new(&manifest, loaded.config.include_test_classes)?;
    let mode = if rebuild {
        PassMode::Rebuild
    } else {
        PassMode::Incremental
    };

    let report = Orchestrator::new(&manifest, &loaded.config, &sink)
        .with_type_search(&search)
        .with_validity_cache(validity)
        .run_pass(mode)
        .context("Enhancement pass failed")?;

    info!(
        "Pass finished: {:?}, {} modules, {} failed",
        report.summary,
        report.modules.len(),
        report.failed_modules().len()
    );
    Ok(())
}
