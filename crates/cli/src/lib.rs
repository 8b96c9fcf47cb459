pub mod cli;
pub mod commands;
pub mod display;
pub mod host;
pub mod project;

// Re-export commonly used items
pub use cli::{Cli, Commands};
pub use host::{BuildManifest, SourceTypeSearch};
pub use project::ProjectPaths;
