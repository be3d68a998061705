//! Configuration for the shell step.
//!
//! This module handles all aspects of configuration:
//! - Keys, defaults and the typed step config in [`schema`]
//! - Layered value lookup in [`lookup`]
//! - File loading in [`loader`]
//! - Deep merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use shell_step::config::{LayeredConfig, ShellStepConfig, ValueLookup};
//!
//! let step: serde_yaml::Mapping = serde_yaml::from_str("shell-script: echo hi").unwrap();
//! let lookup = LayeredConfig::new().with_step(step);
//!
//! let config = ShellStepConfig::from_lookup(&lookup).unwrap();
//! assert_eq!(config.script, "echo hi");
//! assert_eq!(lookup.get_string("shell-interpreter").as_deref(), Some("sh"));
//! ```

pub mod loader;
pub mod lookup;
pub mod merger;
pub mod schema;

pub use loader::{
    load_config_value, load_merged_config, load_previous_results, parse_runtime_overrides,
    StepConfigFile,
};
pub use lookup::{render_value, LayeredConfig, ValueLookup};
pub use merger::{deep_merge, merge_configs};
pub use schema::{
    default_config, validate_required_keys, ShellStepConfig, REQUIRED_KEYS, SHELL_INTERPRETER,
    SHELL_PARAMETERS, SHELL_SCRIPT, STEP_NAME,
};
