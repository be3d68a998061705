//! Command-line interface for the shell step.
//!
//! The binary stands in for a pipeline host: it loads configuration files,
//! runtime values and previous step results, runs the step, and reports the
//! result.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigArgs, RunArgs, SourceArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
