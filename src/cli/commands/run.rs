//! Run command implementation.
//!
//! `shell-step run` executes the step once and reports its result.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cli::args::RunArgs;
use crate::config::LayeredConfig;
use crate::error::{Result, ShellStepError};
use crate::shell::{CaptureSink, OutputLine, StdioSink, TeeSink};
use crate::steps::{ShellStep, StepResult};

use super::display::{render_result, Theme};
use super::dispatcher::{Command, CommandResult};
use super::load_lookup;

/// Exit code when the script itself failed.
pub const SCRIPT_FAILED_EXIT_CODE: i32 = 1;

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Run the step. The captured output is returned even when the step
    /// fails fatally after the script ran.
    fn run_step(
        &self,
        step: &ShellStep,
        lookup: &LayeredConfig,
    ) -> (Result<StepResult>, CaptureSink) {
        if self.args.json {
            // Keep stdout clean for the JSON document.
            let live = |line: OutputLine| eprintln!("{}", line.text());
            let mut sink = TeeSink::new(live, CaptureSink::new());
            let result = step.run_with_sink(lookup, &mut sink);
            (result, sink.second)
        } else {
            let mut sink = TeeSink::stdio_capture();
            let result = step.run_with_sink(lookup, &mut sink);
            (result, sink.second)
        }
    }

    fn report(&self, result: &StepResult) -> Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(anyhow::Error::from)?;

        if let Some(path) = &self.args.output {
            write_file(path, &json)?;
        }

        let mut stdout = std::io::stdout().lock();
        if self.args.json {
            writeln!(stdout, "{}", json)?;
        } else {
            let theme = if console::colors_enabled() {
                Theme::new()
            } else {
                Theme::plain()
            };
            write!(stdout, "{}", render_result(result, &theme))?;
        }
        Ok(())
    }
}

impl Command for RunCommand {
    fn execute(&self) -> Result<CommandResult> {
        let lookup = load_lookup(&self.args.source)?;
        let step = ShellStep::new(&self.args.work_dir);
        let (outcome, captured) = self.run_step(&step, &lookup);

        if let Some(path) = &self.args.log_file {
            write_file(path, &captured.transcript())?;
        }
        let result = outcome?;
        self.report(&result)?;

        if result.success {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(SCRIPT_FAILED_EXIT_CODE))
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(ShellStepError::Io)
}
