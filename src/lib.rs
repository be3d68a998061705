//! shell-step - Run a shell script as a pipeline step.
//!
//! The step runs a user-supplied script inside a fresh workspace, injects
//! resolved parameters as environment variables, and collects files the
//! script leaves in `artifacts/` and `evidence/` into a [`StepResult`].
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, layering and lookup
//! - [`error`] - Error types and result aliases
//! - [`harvest`] - Artifact and evidence file parsing
//! - [`shell`] - Script execution and output streaming
//! - [`steps`] - Parameter resolution, the step itself, and its result
//! - [`workspace`] - Per-invocation workspace directories
//!
//! # Example
//!
//! ```
//! use shell_step::steps::{ParamValue, resolve_parameters};
//! use std::collections::BTreeMap;
//!
//! let lookup = |key: &str| (key == "mode").then(|| serde_yaml::Value::from("release"));
//! let raw = BTreeMap::from([
//!     ("MODE".to_string(), "${mode}".to_string()),
//!     ("LITERAL".to_string(), "as-is".to_string()),
//! ]);
//!
//! let resolved = resolve_parameters(&raw, &lookup).unwrap();
//! assert_eq!(resolved["MODE"], "release");
//! assert_eq!(resolved["LITERAL"], "as-is");
//! assert!(matches!(ParamValue::parse("${mode}"), ParamValue::Reference(_)));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod harvest;
pub mod shell;
pub mod steps;
pub mod workspace;

pub use error::{Result, ShellStepError};
pub use steps::{ShellStep, StepResult};
