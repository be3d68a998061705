//! Step result model.
//!
//! A [`StepResult`] is handed back to the caller and never persisted by the
//! step itself. Serialized results double as "previous step results" input
//! for later steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A named, described output value (an artifact or a piece of evidence).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Entry key (the harvested file name).
    pub name: String,

    /// One-line description.
    pub description: String,

    /// Entry value.
    pub value: String,
}

impl ResultEntry {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: value.into(),
        }
    }
}

/// Result of one step invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepResult {
    /// Step name.
    pub step_name: String,

    /// Whether the script exited successfully.
    pub success: bool,

    /// Failure detail (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Artifacts, in harvest order.
    pub artifacts: Vec<ResultEntry>,

    /// Evidence, in harvest order.
    pub evidence: Vec<ResultEntry>,

    /// Workspace the script ran in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    /// Script exit code (None if killed by signal or never run).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for StepResult {
    fn default() -> Self {
        Self::new("")
    }
}

impl StepResult {
    /// Create a successful, empty result.
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            success: true,
            message: None,
            artifacts: Vec::new(),
            evidence: Vec::new(),
            workspace: None,
            exit_code: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Mark the result failed with a message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.message = Some(message.into());
    }

    pub fn add_artifact(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.artifacts.push(ResultEntry::new(name, value, description));
    }

    pub fn add_evidence(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.evidence.push(ResultEntry::new(name, value, description));
    }

    /// Value of the most recently added artifact named `name`.
    pub fn get_artifact_value(&self, name: &str) -> Option<&str> {
        self.artifacts
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Value of the most recently added evidence named `name`.
    pub fn get_evidence_value(&self, name: &str) -> Option<&str> {
        self.evidence
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Wall-clock run time, if both timestamps were recorded.
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let counts = format!(
            "{} artifact(s), {} evidence",
            self.artifacts.len(),
            self.evidence.len()
        );
        if self.success {
            format!("✓ {} ({})", self.step_name, counts)
        } else {
            let message = self.message.as_deref().unwrap_or("unknown error");
            format!("✗ {} - {} ({})", self.step_name, message, counts)
        }
    }
}
