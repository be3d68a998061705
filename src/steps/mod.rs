//! The shell step and its result model.
//!
//! - [`ShellStep`] - Resolve parameters, prepare a workspace, run, harvest
//! - [`resolve_parameters`] - `${key}` parameter resolution
//! - [`StepResult`] - Success flag, message, artifacts and evidence
//!
//! # Example
//!
//! ```no_run
//! use shell_step::config::LayeredConfig;
//! use shell_step::steps::ShellStep;
//!
//! let step_config: serde_yaml::Mapping = serde_yaml::from_str(
//!     "shell-script: echo built > artifacts/status",
//! ).unwrap();
//! let lookup = LayeredConfig::new().with_step(step_config);
//!
//! let result = ShellStep::new("/tmp/run").run(&lookup).unwrap();
//! for artifact in &result.artifacts {
//!     println!("{} = {}", artifact.name, artifact.value);
//! }
//! ```

pub mod parameters;
pub mod result;
pub mod shell;

pub use parameters::{resolve_parameters, ParamValue, ResolvedParameters};
pub use result::{ResultEntry, StepResult};
pub use shell::{ShellStep, StepPhase};
