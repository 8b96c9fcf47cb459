//! Drives one build pass from discovery to the summary message.

pub mod report;

use tracing::{debug, info, warn};

use crate::bridge::{EnhancerProxy, IsolatedEnhancer, IsolationBoundary, Launcher, ProcessLauncher, context};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::grouping::ModuleGrouper;
use crate::host::{BuildScope, ModuleRef, NoProgress, NoTypeSearch, Progress, TypeSearch};
use crate::processing::{ProcessingUnitRegistry, ValidityCache};
use crate::scanner::discover;
use crate::sink::{MessageLevel, MessageSink};
use crate::types::ModuleEnhancementPlan;

pub use report::{ModuleOutcome, ModuleResult, PassReport, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassMode {
    /// Skip modules whose units are unchanged since their last enhancement.
    #[default]
    Incremental,
    Rebuild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Discovering,
    Grouping,
    PerModuleEnhance { index: usize, module: ModuleRef },
    Reporting,
}

/// Runs build passes against one host. The orchestrator is the only component
/// that writes to the message sink.
pub struct Orchestrator<'a> {
    scope: &'a dyn BuildScope,
    config: &'a Configuration,
    sink: &'a dyn MessageSink,
    type_search: &'a dyn TypeSearch,
    launcher: &'a dyn Launcher,
    progress: &'a dyn Progress,
    validity: ValidityCache,
    trace: Vec<PassState>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        scope: &'a dyn BuildScope,
        config: &'a Configuration,
        sink: &'a dyn MessageSink,
    ) -> Self {
        Self {
            scope,
            config,
            sink,
            type_search: &NoTypeSearch,
            launcher: &ProcessLauncher,
            progress: &NoProgress,
            validity: ValidityCache::new(config.cache_dir.clone()),
            trace: Vec::new(),
        }
    }

    pub fn with_type_search(mut self, type_search: &'a dyn TypeSearch) -> Self {
        self.type_search = type_search;
        self
    }

    pub fn with_launcher(mut self, launcher: &'a dyn Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_validity_cache(mut self, validity: ValidityCache) -> Self {
        self.validity = validity;
        self
    }

    pub fn validity_cache(&self) -> &ValidityCache {
        &self.validity
    }

    /// Runs one pass. Per-file and per-module failures become messages; only a
    /// failure while reporting is returned, after the thread context is restored.
    pub fn run_pass(&mut self, mode: PassMode) -> Result<PassReport> {
        let _context = context::save();
        self.trace.clear();
        self.enter(PassState::Idle);

        let mut report = if self.config.is_active() {
            self.enhance_all(mode)
        } else {
            debug!("Enhancer disabled or no module enabled, skipping pass");
            PassReport::new(Summary::Disabled)
        };

        self.enter(PassState::Reporting);
        self.report(&report)?;
        self.enter(PassState::Idle);

        report.trace = std::mem::take(&mut self.trace);
        Ok(report)
    }

    fn enter(&mut self, state: PassState) {
        debug!("Pass state: {:?}", state);
        self.trace.push(state);
    }

    fn name(&self) -> &str {
        self.config.descriptor().name()
    }

    fn emit(&self, level: MessageLevel, text: &str) {
        self.sink.emit(level, &format!("{} Enhancer: {}", self.name(), text));
    }

    fn enhance_all(&mut self, mode: PassMode) -> PassReport {
        self.enter(PassState::Discovering);
        self.progress
            .set_text(&format!("{} Enhancer running", self.name()));
        let affected = self.scope.affected_modules();
        let discovery = discover(self.scope, self.type_search, self.config, &affected);
        for failure in &discovery.failures {
            self.emit(failure.classification(), &failure.to_string());
        }
        let registry = ProcessingUnitRegistry::from_units(&discovery.units);

        self.enter(PassState::Grouping);
        let grouping = ModuleGrouper::group(&registry, &affected, self.config, self.scope);
        for module in &grouping.missing_output {
            self.emit(
                MessageLevel::Warning,
                &format!("no output directory for module: {module}"),
            );
        }

        let summary = if registry.is_empty() {
            Summary::NothingFound
        } else if grouping.is_empty() {
            Summary::NoModulesAffected
        } else {
            Summary::Enhanced
        };
        let mut report = PassReport::new(summary);
        report.discovery_failures = discovery.failures.len();

        for (index, plan) in grouping.plans.iter().enumerate() {
            if self.progress.is_canceled() {
                warn!("Pass canceled before module {}", plan.module);
                report.summary = Summary::Canceled;
                break;
            }
            self.enter(PassState::PerModuleEnhance {
                index,
                module: plan.module.clone(),
            });

            let outcome = self.process_module(plan, mode);
            report.modules.push(ModuleResult {
                module: plan.module.clone(),
                outcome,
            });
        }

        report
    }

    fn process_module(&mut self, plan: &ModuleEnhancementPlan, mode: PassMode) -> ModuleOutcome {
        if mode == PassMode::Incremental && self.validity.is_up_to_date(plan) {
            let count = self.validity.recorded_count(&plan.module).unwrap_or(0);
            info!("Module {} is up to date", plan.module);
            return ModuleOutcome::UpToDate { count };
        }

        self.progress.set_text(&format!(
            "{} Enhancer enhancing in {}",
            self.name(),
            plan.module
        ));

        match self.enhance_module(plan) {
            Ok(count) => {
                self.validity.record(plan, count);
                ModuleOutcome::Enhanced { count }
            }
            Err(e) => {
                self.validity.invalidate(&plan.module);
                let level = e.classification();
                let message = if e.is_classified() {
                    e.diagnostic()
                } else {
                    format!(
                        "unexpected error in module {}: {}",
                        plan.module,
                        e.diagnostic()
                    )
                };
                self.emit(level, &message);
                ModuleOutcome::Failed { level, message }
            }
        }
    }

    /// Boundary, registration, options, enhance; in that order.
    fn enhance_module(&self, plan: &ModuleEnhancementPlan) -> Result<usize> {
        let boundary = IsolationBoundary::new(
            plan.module.clone(),
            self.config.launcher.runtime_classpath.clone(),
            plan.output_dirs(),
            self.scope.library_classpath(&plan.module),
        )?;
        let mut enhancer = IsolatedEnhancer::open(
            self.config.descriptor().clone(),
            boundary,
            self.config.api(),
            self.launcher,
            &self.config.launcher,
        )?;

        enhancer.add_metadata_files(&plan.metadata_files())?;
        enhancer.add_classes(&plan.class_names())?;
        enhancer.configure(&self.config.options);
        enhancer.enhance()
    }

    fn report(&self, report: &PassReport) -> Result<()> {
        if let Some((level, text)) = report.summary_line(self.name()) {
            self.sink.emit(level, &text);
        }
        if report.summary == Summary::Disabled {
            return Ok(());
        }
        self.validity.save_to_disk().map_err(|e| {
            Error::Other(format!("Failed to save incremental state: {e}"))
        })
    }
}
