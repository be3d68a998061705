//! Config command implementation.
//!
//! `shell-step config` shows what the step would run: the script, the
//! interpreter and the fully resolved parameters. Nothing is executed and no
//! workspace is created.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::args::ConfigArgs;
use crate::config::ShellStepConfig;
use crate::error::Result;
use crate::steps::resolve_parameters;

use super::dispatcher::{Command, CommandResult};
use super::load_lookup;

/// Resolved view of the step configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfig {
    pub step_name: String,
    pub shell_interpreter: String,
    pub shell_script: String,
    pub shell_parameters: BTreeMap<String, String>,
}

/// The config command implementation.
pub struct ConfigCommand {
    args: ConfigArgs,
}

impl ConfigCommand {
    pub fn new(args: ConfigArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }

    /// Resolve the configuration without running the step.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let lookup = load_lookup(&self.args.source)?;
        let config = ShellStepConfig::from_lookup(&lookup)?;
        let shell_parameters = resolve_parameters(&config.parameters, &lookup)?;
        Ok(ResolvedConfig {
            step_name: config.step_name,
            shell_interpreter: config.interpreter,
            shell_script: config.script,
            shell_parameters,
        })
    }
}

impl Command for ConfigCommand {
    fn execute(&self) -> Result<CommandResult> {
        let resolved = self.resolve()?;

        let rendered = if self.args.json {
            serde_json::to_string_pretty(&resolved).map_err(anyhow::Error::from)?
        } else {
            serde_yaml::to_string(&resolved).map_err(anyhow::Error::from)?
        };
        println!("{}", rendered.trim_end());

        Ok(CommandResult::success())
    }
}
