//! Configuration keys, defaults and the typed shell step configuration.
//!
//! | Key | Required | Default |
//! |---|---|---|
//! | `shell-script` | yes | |
//! | `shell-parameters` | no | `{}` |
//! | `shell-interpreter` | no | `sh` |
//! | `step-name` | no | `shell` |

use crate::config::lookup::{render_value, ValueLookup};
use crate::error::{Result, ShellStepError};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Script body to execute.
pub const SHELL_SCRIPT: &str = "shell-script";

/// Environment variables to inject into the script.
pub const SHELL_PARAMETERS: &str = "shell-parameters";

/// Shell binary used to run the script.
pub const SHELL_INTERPRETER: &str = "shell-interpreter";

/// Label recorded on the step result.
pub const STEP_NAME: &str = "step-name";

/// Keys that must resolve from configuration or previous step results
/// before the step may run.
pub const REQUIRED_KEYS: &[&str] = &[SHELL_SCRIPT];

const DEFAULT_INTERPRETER: &str = "sh";
const DEFAULT_STEP_NAME: &str = "shell";

/// Lowest-precedence configuration values.
pub fn default_config() -> Mapping {
    let mut defaults = Mapping::new();
    defaults.insert(
        Value::String(SHELL_PARAMETERS.to_string()),
        Value::Mapping(Mapping::new()),
    );
    defaults.insert(
        Value::String(SHELL_INTERPRETER.to_string()),
        Value::String(DEFAULT_INTERPRETER.to_string()),
    );
    defaults.insert(
        Value::String(STEP_NAME.to_string()),
        Value::String(DEFAULT_STEP_NAME.to_string()),
    );
    defaults
}

/// Step configuration after lookup, before parameter resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellStepConfig {
    /// Script text, written verbatim to `script.sh`.
    pub script: String,

    /// Raw parameter values; may still contain `${key}` references.
    pub parameters: BTreeMap<String, String>,

    /// Shell binary.
    pub interpreter: String,

    /// Step label.
    pub step_name: String,
}

impl ShellStepConfig {
    /// Read the step configuration through a lookup.
    ///
    /// # Errors
    ///
    /// Returns `MissingConfig` if a required key has no value, or
    /// `InvalidConfig` if `shell-parameters` is not a string-keyed mapping.
    pub fn from_lookup(lookup: &dyn ValueLookup) -> Result<Self> {
        validate_required_keys(lookup)?;

        let script = lookup
            .get_string(SHELL_SCRIPT)
            .ok_or_else(|| ShellStepError::MissingConfig {
                key: SHELL_SCRIPT.to_string(),
            })?;

        let parameters = match lookup.get_value(SHELL_PARAMETERS) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(value) => parse_parameters(&value)?,
        };

        let interpreter = lookup
            .get_string(SHELL_INTERPRETER)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string());

        let step_name = lookup
            .get_string(STEP_NAME)
            .unwrap_or_else(|| DEFAULT_STEP_NAME.to_string());

        Ok(Self {
            script,
            parameters,
            interpreter,
            step_name,
        })
    }
}

/// Check that every key in [`REQUIRED_KEYS`] resolves.
pub fn validate_required_keys(lookup: &dyn ValueLookup) -> Result<()> {
    for key in REQUIRED_KEYS {
        match lookup.get_value(key) {
            None | Some(Value::Null) => {
                return Err(ShellStepError::MissingConfig {
                    key: (*key).to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn parse_parameters(value: &Value) -> Result<BTreeMap<String, String>> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| ShellStepError::InvalidConfig {
            key: SHELL_PARAMETERS.to_string(),
            message: "expected a mapping of parameter name to value".to_string(),
        })?;

    let mut parameters = BTreeMap::new();
    for (name, raw) in mapping {
        let name = name
            .as_str()
            .ok_or_else(|| ShellStepError::InvalidConfig {
                key: SHELL_PARAMETERS.to_string(),
                message: format!("parameter names must be strings, got {:?}", name),
            })?;
        let raw = render_value(raw).ok_or_else(|| ShellStepError::InvalidConfig {
            key: SHELL_PARAMETERS.to_string(),
            message: format!("parameter {} has no value", name),
        })?;
        parameters.insert(name.to_string(), raw);
    }
    Ok(parameters)
}
