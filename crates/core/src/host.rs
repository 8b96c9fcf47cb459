//! Interfaces the host build system provides to a pass.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A module of the host build, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleRef {
    name: String,
}

impl ModuleRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Module graph and compile-scope view of the current build.
pub trait BuildScope {
    /// Modules touched by this build, in the order the host reports them.
    fn affected_modules(&self) -> Vec<ModuleRef>;

    /// Compiled output of a module; `tests` selects the test output.
    fn output_directory(&self, module: &ModuleRef, tests: bool) -> Option<PathBuf>;

    /// Resolved library classpath of the module, transitive.
    fn library_classpath(&self, module: &ModuleRef) -> Vec<PathBuf>;

    /// Extra directories searched for declarative metadata besides the output tree.
    fn metadata_search_paths(&self, _module: &ModuleRef) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Finds types carrying a marker annotation. Backed by the host's type index.
pub trait TypeSearch {
    fn find_annotated_types(&self, module: &ModuleRef, annotation: &str) -> Result<Vec<String>>;
}

/// Used when the host has no type index: annotation discovery finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypeSearch;

impl TypeSearch for NoTypeSearch {
    fn find_annotated_types(&self, _module: &ModuleRef, _annotation: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Progress reporting and the build-level cancel signal.
pub trait Progress {
    fn set_text(&self, _text: &str) {}

    /// Checked between modules only.
    fn is_canceled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Cancel flag shared with whoever drives the build.
#[derive(Debug, Default, Clone)]
pub struct CancelFlag {
    canceled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}

impl Progress for CancelFlag {
    fn set_text(&self, text: &str) {
        tracing::debug!("progress: {}", text);
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}
