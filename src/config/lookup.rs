//! Value lookup across configuration layers and previous step results.
//!
//! The step reads every configuration key, and every `${key}` parameter
//! reference, through a single [`ValueLookup`]. [`LayeredConfig`] is the
//! standard implementation; any closure `Fn(&str) -> Option<Value>` also
//! works, which keeps the step testable without building config files.
//!
//! # Resolution Order
//!
//! 1. Runtime configuration (highest priority)
//! 2. Step configuration
//! 3. Global configuration
//! 4. Artifacts of previous step results, most recent first
//! 5. Step defaults (lowest priority)

use crate::config::schema::default_config;
use crate::steps::result::StepResult;
use serde_yaml::{Mapping, Value};

/// Source of configuration values and previous-result artifacts.
pub trait ValueLookup {
    /// Look up `key`. `None` means the key resolves to nothing.
    fn get_value(&self, key: &str) -> Option<Value>;

    /// Look up `key` and render it as a string.
    fn get_string(&self, key: &str) -> Option<String> {
        self.get_value(key).as_ref().and_then(render_value)
    }
}

impl<F> ValueLookup for F
where
    F: Fn(&str) -> Option<Value>,
{
    fn get_value(&self, key: &str) -> Option<Value> {
        self(key)
    }
}

/// Render a config value as the string handed to the script.
///
/// Scalars render as their plain text, sequences and mappings as compact
/// JSON. Null renders as nothing.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => render_value(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_json::to_string(value)
            .ok()
            .or_else(|| serde_yaml::to_string(value).ok().map(|s| s.trim().to_string())),
    }
}

/// Configuration layered by precedence.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Values supplied for this run only.
    pub runtime: Mapping,

    /// Configuration of this step.
    pub step: Mapping,

    /// Configuration shared by every step.
    pub global: Mapping,

    /// Results of steps that already ran, oldest first.
    pub previous_results: Vec<StepResult>,

    /// Step defaults.
    pub defaults: Mapping,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LayeredConfig {
    /// Create a lookup holding only the step defaults.
    pub fn new() -> Self {
        Self {
            runtime: Mapping::new(),
            step: Mapping::new(),
            global: Mapping::new(),
            previous_results: Vec::new(),
            defaults: default_config(),
        }
    }

    pub fn with_runtime(mut self, runtime: Mapping) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_step(mut self, step: Mapping) -> Self {
        self.step = step;
        self
    }

    pub fn with_global(mut self, global: Mapping) -> Self {
        self.global = global;
        self
    }

    pub fn with_previous_results(mut self, results: Vec<StepResult>) -> Self {
        self.previous_results = results;
        self
    }

    fn config_value(&self, key: &str) -> Option<Value> {
        [&self.runtime, &self.step, &self.global]
            .into_iter()
            .find_map(|layer| non_null(layer, key))
    }

    fn previous_result_value(&self, key: &str) -> Option<Value> {
        self.previous_results
            .iter()
            .rev()
            .find_map(|result| result.get_artifact_value(key))
            .map(|value| Value::String(value.to_string()))
    }
}

impl ValueLookup for LayeredConfig {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.config_value(key)
            .or_else(|| self.previous_result_value(key))
            .or_else(|| non_null(&self.defaults, key))
    }
}

fn non_null(layer: &Mapping, key: &str) -> Option<Value> {
    layer.get(key).filter(|value| !value.is_null()).cloned()
}
