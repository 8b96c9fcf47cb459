use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    clean_command, config_command, discover_command, enhance_command, init_command,
    modules_command, toggle_command,
};
use crate::project::ProjectPaths;

#[derive(Parser, Debug)]
#[command(name = "enhancer-runner")]
#[command(version, about = "Run the persistence bytecode enhancer over a multi-module build", long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Build manifest (enhancer-build.json or .toml); searched upwards when omitted
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Configuration file; searched upwards when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project directory to work in instead of the current directory
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enhance the affected, enabled modules
    #[command(visible_alias = "e")]
    Enhance {
        /// Ignore incremental state and enhance every module
        #[arg(long)]
        rebuild: bool,
    },
    /// List metadata files and annotated classes per module
    #[command(visible_alias = "d")]
    Discover,
    /// List modules with enhancer presence and enabled state
    Modules,
    /// Write a configuration enabling every module that can be enhanced
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Turn enhancement on, or enable the given modules
    Enable {
        /// Module names
        modules: Vec<String>,
    },
    /// Turn enhancement off, or disable the given modules
    Disable {
        /// Module names
        modules: Vec<String>,
    },
    /// Show the resolved configuration
    Config,
    /// Delete incremental state
    Clean,
}

impl Cli {
    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths {
            project: self.project.clone(),
            manifest: self.manifest.clone(),
            config: self.config.clone(),
        }
    }

    /// Execute the command
    pub fn execute(self) -> Result<()> {
        let paths = self.paths();
        match self.command {
            Commands::Enhance { rebuild } => enhance_command(&paths, rebuild),
            Commands::Discover => discover_command(&paths),
            Commands::Modules => modules_command(&paths),
            Commands::Init { force } => init_command(&paths, force),
            Commands::Enable { modules } => toggle_command(&paths, true, &modules),
            Commands::Disable { modules } => toggle_command(&paths, false, &modules),
            Commands::Config => config_command(&paths),
            Commands::Clean => clean_command(&paths),
        }
    }
}
