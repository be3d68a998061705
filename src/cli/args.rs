//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run a shell script as a pipeline step and collect its artifacts and evidence.
#[derive(Debug, Parser)]
#[command(name = "shell-step")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the step
    Run(RunArgs),

    /// Show the resolved step configuration without running anything
    Config(ConfigArgs),
}

/// Where configuration values come from.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SourceArgs {
    /// Step config file (repeatable; later files override earlier ones)
    #[arg(short, long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Runtime configuration value (repeatable; highest precedence)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// JSON file with previous step results
    #[arg(short, long, value_name = "FILE")]
    pub results: Option<PathBuf>,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Base directory for step workspaces
    #[arg(short, long, env = "SHELL_STEP_WORK_DIR", default_value = "step-runner-working")]
    pub work_dir: PathBuf,

    /// Print the step result as JSON (script output goes to stderr)
    #[arg(long)]
    pub json: bool,

    /// Also write the step result as JSON to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the captured script output to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
