//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.

pub mod config;
pub mod dispatcher;
pub mod display;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use crate::cli::args::SourceArgs;
use crate::config::{
    load_merged_config, load_previous_results, parse_runtime_overrides, LayeredConfig,
};
use crate::error::Result;

/// Build the value lookup from config files, `--set` values and previous results.
pub fn load_lookup(source: &SourceArgs) -> Result<LayeredConfig> {
    let file = load_merged_config(&source.config)?;
    let runtime = parse_runtime_overrides(&source.set)?;
    let previous = match &source.results {
        Some(path) => load_previous_results(path)?,
        None => Vec::new(),
    };
    Ok(file.into_lookup(runtime, previous))
}
