//! Integration tests for incremental passes backed by the on-disk validity cache
mod common;

use std::time::{Duration, SystemTime};

use common::{ORM_FOO, RecordingLauncher, Workspace};
use enhancer_runner_core::orchestrator::ModuleOutcome;
use enhancer_runner_core::{
    CollectingSink, Configuration, MessageLevel, ModuleRef, Orchestrator, PassMode, ValidityCache,
};

fn workspace_with_core() -> Workspace {
    let mut workspace = Workspace::new();
    workspace.module("core");
    workspace.with_enhancer("core");
    workspace.write_file("core", "META-INF/Foo.orm", ORM_FOO);
    workspace.write_class("core", "a.b.Foo");
    workspace.write_class("core", "c.D");
    workspace.annotate("core", "c.D");
    workspace
}

fn config_with_cache(workspace: &Workspace) -> Configuration {
    let mut config = Configuration::default();
    config.enabled_modules.insert("core".to_string());
    config.cache_dir = Some(workspace.root().join(".enhancer-cache"));
    config
}

fn run(
    workspace: &Workspace,
    config: &Configuration,
    launcher: &RecordingLauncher,
    mode: PassMode,
) -> (enhancer_runner_core::PassReport, CollectingSink) {
    let sink = CollectingSink::new();
    let cache = ValidityCache::open(config.cache_dir.clone().unwrap()).unwrap();
    let report = Orchestrator::new(workspace, config, &sink)
        .with_type_search(workspace)
        .with_launcher(launcher)
        .with_validity_cache(cache)
        .run_pass(mode)
        .unwrap();
    (report, sink)
}

#[test]
fn test_unchanged_rerun_skips_launch_and_reports_same_count() {
    let workspace = workspace_with_core();
    let config = config_with_cache(&workspace);
    let launcher = RecordingLauncher::new();

    let (first, first_sink) = run(&workspace, &config, &launcher, PassMode::Incremental);
    let (second, second_sink) = run(&workspace, &config, &launcher, PassMode::Incremental);

    assert_eq!(launcher.count(), 1);
    assert_eq!(first.modules[0].outcome, ModuleOutcome::Enhanced { count: 2 });
    assert_eq!(second.modules[0].outcome, ModuleOutcome::UpToDate { count: 2 });
    assert_eq!(
        first_sink.with_level(MessageLevel::Info),
        second_sink.with_level(MessageLevel::Info)
    );
}

#[test]
fn test_changed_class_is_enhanced_again() {
    let workspace = workspace_with_core();
    let config = config_with_cache(&workspace);
    let launcher = RecordingLauncher::new();
    run(&workspace, &config, &launcher, PassMode::Incremental);

    // Recompiled after the last pass.
    let class_file = workspace.write_class("core", "c.D");
    std::fs::File::options()
        .write(true)
        .open(&class_file)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(120))
        .unwrap();

    let (report, _) = run(&workspace, &config, &launcher, PassMode::Incremental);
    assert_eq!(launcher.count(), 2);
    assert!(matches!(
        report.modules[0].outcome,
        ModuleOutcome::Enhanced { .. }
    ));
}

#[test]
fn test_rebuild_ignores_the_cache() {
    let workspace = workspace_with_core();
    let config = config_with_cache(&workspace);
    let launcher = RecordingLauncher::new();

    run(&workspace, &config, &launcher, PassMode::Incremental);
    let (report, _) = run(&workspace, &config, &launcher, PassMode::Rebuild);

    assert_eq!(launcher.count(), 2);
    assert!(matches!(
        report.modules[0].outcome,
        ModuleOutcome::Enhanced { .. }
    ));
}

#[test]
fn test_failed_module_is_not_cached() {
    let workspace = workspace_with_core();
    let config = config_with_cache(&workspace);
    let failing = RecordingLauncher::new().fail_for(
        workspace.output("core"),
        enhancer_runner_core::bridge::LaunchOutput::failed(1, "boom"),
    );

    let (report, _) = run(&workspace, &config, &failing, PassMode::Incremental);
    assert_eq!(report.failed_modules(), vec![&ModuleRef::new("core")]);

    let cache = ValidityCache::open(config.cache_dir.clone().unwrap()).unwrap();
    assert!(!cache.contains(&ModuleRef::new("core")));

    let launcher = RecordingLauncher::new();
    run(&workspace, &config, &launcher, PassMode::Incremental);
    assert_eq!(launcher.count(), 1);
}

#[test]
fn test_same_orchestrator_keeps_its_cache_between_passes() {
    let workspace = workspace_with_core();
    let mut config = Configuration::default();
    config.enabled_modules.insert("core".to_string());
    let sink = CollectingSink::new();
    let launcher = RecordingLauncher::new();
    let mut orchestrator = Orchestrator::new(&workspace, &config, &sink)
        .with_type_search(&workspace)
        .with_launcher(&launcher);

    orchestrator.run_pass(PassMode::Incremental).unwrap();
    let report = orchestrator.run_pass(PassMode::Incremental).unwrap();

    assert_eq!(launcher.count(), 1);
    assert_eq!(report.enhanced_count(), 2);
    assert!(orchestrator.validity_cache().contains(&ModuleRef::new("core")));
}
