//! Error types for shell step operations.
//!
//! This module defines [`ShellStepError`], the error type returned for every
//! fatal step failure, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration, workspace and harvest problems are fatal and surface as
//!   `ShellStepError`
//! - A script exiting non-zero is *not* an error; it is recorded on the
//!   [`StepResult`](crate::steps::StepResult)
//! - Use `anyhow::Error` (via `ShellStepError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for shell step operations.
#[derive(Debug, Error)]
pub enum ShellStepError {
    /// A required configuration key has no value in any source.
    #[error("Missing required configuration or previous step result artifact: {key}")]
    MissingConfig { key: String },

    /// A configuration value has the wrong shape.
    #[error("Invalid value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    /// A `${key}` parameter reference did not resolve.
    #[error("Parameter {parameter}: config value/artifact with name {key} does not exist")]
    UnresolvedParameter { parameter: String, key: String },

    /// Failed to parse a configuration or results file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Creating the workspace or writing the script failed.
    #[error("Failed to prepare workspace at {path}: {source}")]
    WorkspacePreparation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shell interpreter could not be started.
    #[error("Failed to launch '{interpreter}': {source}")]
    ScriptLaunch {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    /// A harvested file is not valid UTF-8.
    #[error("Harvested file is not valid UTF-8 text: {path}")]
    HarvestDecode { path: PathBuf },

    /// A harvested file or directory could not be read.
    #[error("Failed to read {path}: {source}")]
    HarvestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for shell step operations.
pub type Result<T> = std::result::Result<T, ShellStepError>;
