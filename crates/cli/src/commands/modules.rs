use anyhow::Result;
use enhancer_runner_core::bridge::{Dispatcher, IsolationBoundary};
use enhancer_runner_core::scanner::discovery::output_dirs;
use enhancer_runner_core::{BuildScope, Configuration, ModuleRef};
use tracing::debug;

use crate::display::yes_no;
use crate::host::BuildManifest;
use crate::project::ProjectPaths;

pub fn modules_command(paths: &ProjectPaths) -> Result<()> {
    let manifest = paths.load_manifest()?;
    let config = paths.load_config()?.config;
    let affected = manifest.affected_modules();

    println!(
        "{:<24} {:<10} {:<8} {}",
        "MODULE", "ENHANCER", "ENABLED", "AFFECTED"
    );
    for module in manifest.module_refs() {
        println!(
            "{:<24} {:<10} {:<8} {}",
            module.name(),
            yes_no(has_enhancer(&manifest, &config, &module)),
            yes_no(config.is_module_enabled(&module)),
            yes_no(affected.contains(&module))
        );
    }
    Ok(())
}

/// Whether the module's boundary would contain the configured enhancer.
pub fn has_enhancer(manifest: &BuildManifest, config: &Configuration, module: &ModuleRef) -> bool {
    let boundary = match IsolationBoundary::new(
        module.clone(),
        config.launcher.runtime_classpath.clone(),
        output_dirs(manifest, module, config.include_test_classes),
        manifest.library_classpath(module),
    ) {
        Ok(boundary) => boundary,
        Err(e) => {
            debug!("Could not inspect classpath of {}: {}", module, e);
            return false;
        }
    };
    let found = Dispatcher::new(config.descriptor(), &boundary)
        .entry_point()
        .is_ok();
    if let Err(e) = boundary.teardown() {
        debug!("Failed to remove scratch directory: {}", e);
    }
    found
}

/// Modules of the manifest whose classpath carries the enhancer.
pub fn supported_modules(manifest: &BuildManifest, config: &Configuration) -> Vec<ModuleRef> {
    manifest
        .module_refs()
        .into_iter()
        .filter(|module| has_enhancer(manifest, config, module))
        .collect()
}
