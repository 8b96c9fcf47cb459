//! Partitions processing units into per-module enhancement plans.

use tracing::debug;

use crate::config::Configuration;
use crate::host::{BuildScope, ModuleRef};
use crate::processing::ProcessingUnitRegistry;
use crate::types::ModuleEnhancementPlan;

#[derive(Debug, Default)]
pub struct Grouping {
    /// In the host's affected-module order.
    pub plans: Vec<ModuleEnhancementPlan>,
    /// Enabled modules left out because they have no output directory.
    pub missing_output: Vec<ModuleRef>,
}

impl Grouping {
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

pub struct ModuleGrouper;

impl ModuleGrouper {
    /// Plans for the modules that are affected, enabled and own at least one unit.
    pub fn group(
        registry: &ProcessingUnitRegistry,
        affected: &[ModuleRef],
        config: &Configuration,
        scope: &dyn BuildScope,
    ) -> Grouping {
        let mut grouping = Grouping::default();

        for module in affected {
            if !config.is_module_enabled(module) {
                debug!("Module {} is not enabled", module);
                continue;
            }
            let Some(output_dir) = scope.output_directory(module, false) else {
                grouping.missing_output.push(module.clone());
                continue;
            };
            if !registry.has_module(module) {
                continue;
            }

            let test_output_dir = if config.include_test_classes {
                scope
                    .output_directory(module, true)
                    .filter(|dir| *dir != output_dir)
            } else {
                None
            };

            let mut plan = ModuleEnhancementPlan::new(module.clone(), output_dir, test_output_dir);
            for unit in registry.for_module(module) {
                plan.push(unit.clone());
            }
            debug!(
                "Module {}: {} declarative, {} annotated units",
                module,
                plan.declarative.len(),
                plan.annotated.len()
            );
            grouping.plans.push(plan);
        }

        grouping
    }
}
