//! Step configuration file loading.
//!
//! A step config file has two optional top-level mappings:
//!
//! ```yaml
//! global:
//!   app-version: 1.4.2
//! step:
//!   shell-script: |
//!     echo "building $VERSION"
//!   shell-parameters:
//!     VERSION: ${app-version}
//! ```
//!
//! Several files may be given; they are deep-merged in order.

use crate::config::lookup::LayeredConfig;
use crate::config::merger::merge_configs;
use crate::error::{Result, ShellStepError};
use crate::steps::result::StepResult;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Parsed contents of one or more merged step config files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfigFile {
    /// Values shared by every step.
    pub global: Mapping,

    /// Values for this step.
    pub step: Mapping,
}

impl StepConfigFile {
    /// Build a lookup from this file plus runtime values and previous results.
    pub fn into_lookup(self, runtime: Mapping, previous_results: Vec<StepResult>) -> LayeredConfig {
        LayeredConfig::new()
            .with_global(self.global)
            .with_step(self.step)
            .with_runtime(runtime)
            .with_previous_results(previous_results)
    }
}

/// Load a config file as raw YAML Value (for merging).
///
/// # Errors
///
/// Returns `ConfigParse` if the file is missing or the YAML is invalid.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| ShellStepError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| ShellStepError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge config files in the given order (later wins).
pub fn load_merged_config(paths: &[PathBuf]) -> Result<StepConfigFile> {
    let mut configs = Vec::with_capacity(paths.len());
    for path in paths {
        configs.push(load_config_value(path)?);
    }

    let merged = merge_configs(&configs);

    serde_yaml::from_value(merged).map_err(|e| ShellStepError::ConfigParse {
        path: paths.last().cloned().unwrap_or_default(),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Parse `key=value` runtime overrides.
///
/// The value is taken verbatim as a string; everything after the first `=`
/// belongs to the value.
pub fn parse_runtime_overrides(pairs: &[String]) -> Result<Mapping> {
    let mut runtime = Mapping::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| ShellStepError::InvalidConfig {
                key: pair.clone(),
                message: "runtime values must be written as key=value".to_string(),
            })?;
        runtime.insert(
            Value::String(key.to_string()),
            Value::String(value.to_string()),
        );
    }
    Ok(runtime)
}

/// Load previous step results from a JSON file.
///
/// The file holds either a single result object or an array of results,
/// oldest first.
pub fn load_previous_results(path: &Path) -> Result<Vec<StepResult>> {
    let content = fs::read_to_string(path).map_err(|e| ShellStepError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ResultsFile {
        Many(Vec<StepResult>),
        One(Box<StepResult>),
    }

    let parsed: ResultsFile =
        serde_json::from_str(&content).map_err(|e| ShellStepError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(match parsed {
        ResultsFile::Many(results) => results,
        ResultsFile::One(result) => vec![*result],
    })
}
