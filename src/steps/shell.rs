//! The shell step: resolve, prepare, execute, harvest.
//!
//! ```text
//! Init → Resolving → WorkspacePrep → Executing → Harvesting → Done
//!            ↓             ↓
//!          Failed        Failed
//! ```
//!
//! `Failed` aborts before any script runs. A script exiting non-zero still
//! reaches `Done`, with `success = false`, and is still harvested.

use crate::config::lookup::ValueLookup;
use crate::config::schema::ShellStepConfig;
use crate::error::Result;
use crate::harvest::harvest_workspace;
use crate::shell::{execute_script, KillHandle, OutputSink, ScriptOptions, StdioSink};
use crate::steps::parameters::resolve_parameters;
use crate::steps::result::StepResult;
use crate::workspace::{UuidGenerator, Workspace, WorkspaceIdGenerator};
use chrono::Utc;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Phase of a step invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Init,
    Resolving,
    WorkspacePrep,
    Executing,
    Harvesting,
    Done,
    Failed,
}

impl StepPhase {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepPhase::Done | StepPhase::Failed)
    }
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepPhase::Init => "init",
            StepPhase::Resolving => "resolving",
            StepPhase::WorkspacePrep => "workspace-prep",
            StepPhase::Executing => "executing",
            StepPhase::Harvesting => "harvesting",
            StepPhase::Done => "done",
            StepPhase::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Runs a user-supplied script in a fresh workspace under `work_dir`.
///
/// A step holds no per-run state, so one step can serve concurrent runs.
#[derive(Clone)]
pub struct ShellStep {
    work_dir: PathBuf,
    ids: Arc<dyn WorkspaceIdGenerator>,
}

impl fmt::Debug for ShellStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellStep")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl ShellStep {
    /// Create a step using random workspace IDs.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replace the workspace ID generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn WorkspaceIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Run the step, streaming script output to this process's stdio.
    pub fn run(&self, lookup: &dyn ValueLookup) -> Result<StepResult> {
        self.run_with_sink(lookup, &mut StdioSink)
    }

    /// Run the step, sending script output to `sink`.
    ///
    /// # Errors
    ///
    /// Configuration, workspace, launch and harvest-decoding failures. A
    /// script exiting non-zero is reported on the returned result instead.
    pub fn run_with_sink(
        &self,
        lookup: &dyn ValueLookup,
        sink: &mut dyn OutputSink,
    ) -> Result<StepResult> {
        self.run_with_kill(lookup, sink, &KillHandle::new())
    }

    /// Run the step; `kill` stops this run's script from another thread.
    ///
    /// Pass a fresh [`KillHandle`] for every run. An interrupted script is
    /// still harvested.
    pub fn run_with_kill(
        &self,
        lookup: &dyn ValueLookup,
        sink: &mut dyn OutputSink,
        kill: &KillHandle,
    ) -> Result<StepResult> {
        let mut phase = StepPhase::Init;
        let outcome = self.run_phases(lookup, sink, kill, &mut phase);
        match &outcome {
            Ok(result) => {
                if result.success {
                    tracing::info!("{}", result.summary_line());
                } else {
                    tracing::warn!("{}", result.summary_line());
                }
            }
            Err(e) => {
                tracing::error!("Step failed during {}: {}", phase, e);
                transition(&mut phase, StepPhase::Failed);
            }
        }
        outcome
    }

    fn run_phases(
        &self,
        lookup: &dyn ValueLookup,
        sink: &mut dyn OutputSink,
        kill: &KillHandle,
        phase: &mut StepPhase,
    ) -> Result<StepResult> {
        let started_at = Utc::now();

        transition(phase, StepPhase::Resolving);
        let config = ShellStepConfig::from_lookup(lookup)?;
        let env = resolve_parameters(&config.parameters, lookup)?;

        transition(phase, StepPhase::WorkspacePrep);
        let workspace = Workspace::create(&self.work_dir, self.ids.as_ref())?;
        let script_path = workspace.write_script(&config.script)?;

        let mut result = StepResult::new(&config.step_name);
        result.workspace = Some(workspace.root().to_path_buf());
        result.started_at = Some(started_at);

        transition(phase, StepPhase::Executing);
        tracing::info!(
            "Running step '{}' in {}",
            config.step_name,
            workspace.root().display()
        );
        let options = ScriptOptions {
            interpreter: config.interpreter,
            cwd: workspace.root().to_path_buf(),
            env,
        };
        let script = execute_script(&script_path, &options, sink, kill)?;
        result.exit_code = script.exit_code;
        if let Some(message) = script.failure_message() {
            result.fail(message);
        }

        transition(phase, StepPhase::Harvesting);
        harvest_workspace(&workspace, &mut result)?;
        result.finished_at = Some(Utc::now());

        transition(phase, StepPhase::Done);
        Ok(result)
    }
}

fn transition(phase: &mut StepPhase, next: StepPhase) {
    debug_assert!(!phase.is_terminal(), "step already finished ({})", phase);
    tracing::debug!("Step phase {} -> {}", phase, next);
    *phase = next;
}
