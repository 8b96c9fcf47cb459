//! Running the enhancer for one module inside a disposable boundary
//!
//! A boundary is built per module from the module's output and library jars,
//! the enhancer is resolved inside it by name, driven through [`EnhancerProxy`],
//! and the boundary is torn down when `enhance` returns.

pub mod boundary;
pub mod context;
pub mod dispatch;
pub mod launcher;
pub mod proxy;

use std::path::Path;

use crate::config::EnhancerOptions;
use crate::error::Result;

pub use boundary::{BoundaryId, IsolationBoundary};
pub use context::ContextGuard;
pub use dispatch::{Dispatcher, ToolDiagnostics};
pub use launcher::{Invocation, LaunchOutput, Launcher, ProcessLauncher};
pub use proxy::IsolatedEnhancer;

/// The contract the orchestrator drives an enhancer through. Registration
/// happens before `configure`, which happens before `enhance`.
pub trait EnhancerProxy {
    fn add_metadata_files(&mut self, paths: &[&Path]) -> Result<()>;

    fn add_classes(&mut self, class_names: &[&str]) -> Result<()>;

    /// Best effort: toggles the integration has no member for are skipped.
    fn configure(&mut self, options: &EnhancerOptions);

    /// Runs the enhancer and returns how many classes it changed. Returns 0
    /// without running anything when nothing was registered.
    fn enhance(self) -> Result<usize>
    where
        Self: Sized;
}
