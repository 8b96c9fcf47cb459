use serde::Serialize;

use super::PassState;
use crate::host::ModuleRef;
use crate::sink::MessageLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ModuleOutcome {
    Enhanced { count: usize },
    /// Skipped by the incremental check; `count` is the recorded result.
    UpToDate { count: usize },
    Failed { level: MessageLevel, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub module: ModuleRef,
    #[serde(flatten)]
    pub outcome: ModuleOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    /// Feature off or no module enabled; nothing was looked at.
    Disabled,
    /// Discovery produced no processing unit at all.
    NothingFound,
    /// Units exist but none belongs to an affected, enabled module with output.
    NoModulesAffected,
    Enhanced,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub summary: Summary,
    pub modules: Vec<ModuleResult>,
    pub discovery_failures: usize,
    #[serde(skip)]
    pub trace: Vec<PassState>,
}

impl PassReport {
    pub fn new(summary: Summary) -> Self {
        Self {
            summary,
            modules: Vec::new(),
            discovery_failures: 0,
            trace: Vec::new(),
        }
    }

    /// Classes enhanced in this pass, recorded counts of up-to-date modules included.
    pub fn enhanced_count(&self) -> usize {
        self.modules
            .iter()
            .map(|result| match result.outcome {
                ModuleOutcome::Enhanced { count } | ModuleOutcome::UpToDate { count } => count,
                ModuleOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failed_modules(&self) -> Vec<&ModuleRef> {
        self.modules
            .iter()
            .filter(|result| matches!(result.outcome, ModuleOutcome::Failed { .. }))
            .map(|result| &result.module)
            .collect()
    }

    /// The one line a pass reports, prefixed with the enhancer's display name.
    pub fn summary_line(&self, enhancer_name: &str) -> Option<(MessageLevel, String)> {
        let (level, text) = match self.summary {
            Summary::Disabled => return None,
            Summary::NothingFound => (
                MessageLevel::Warning,
                "no metadata- or annotated class-files found".to_string(),
            ),
            Summary::NoModulesAffected => (
                MessageLevel::Warning,
                "no Hibernate/JPA metadata or annotated class files found".to_string(),
            ),
            Summary::Enhanced => (
                MessageLevel::Info,
                format!("Successfully enhanced {} classes", self.enhanced_count()),
            ),
            Summary::Canceled => (
                MessageLevel::Warning,
                format!("Canceled after enhancing {} classes", self.enhanced_count()),
            ),
        };
        Some((level, format!("{enhancer_name} Enhancer: {text}")))
    }
}
