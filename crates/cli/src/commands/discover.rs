use anyhow::Result;
use enhancer_runner_core::scanner::discover;

use crate::display::{format_message, format_unit};
use crate::host::SourceTypeSearch;
use crate::project::ProjectPaths;

/// Lists metadata files and annotated classes of every module in the manifest,
/// enabled or not.
pub fn discover_command(paths: &ProjectPaths) -> Result<()> {
    let manifest = paths.load_manifest()?;
    let mut config = paths.load_config()?.config;
    config.enabled_modules = manifest.modules.iter().map(|m| m.name.clone()).collect();
    config.enabled_files.clear();

    let search = SourceTypeSearch::new(&manifest, config.include_test_classes)?;
    let modules = manifest.module_refs();
    let discovery = discover(&manifest, &search, &config, &modules);

    for failure in &discovery.failures {
        println!("{}", format_message(failure.classification(), &failure.to_string()));
    }
    if discovery.is_empty() {
        println!("No metadata files or annotated classes found");
        return Ok(());
    }

    for module in &modules {
        let units: Vec<_> = discovery.units_for(module).collect();
        if units.is_empty() {
            continue;
        }
        println!("📦 {} ({} entries)", module, units.len());
        for unit in units {
            println!("{}", format_unit(unit));
        }
    }
    Ok(())
}
