//! Isolated per-invocation workspaces.
//!
//! Each step invocation gets a fresh directory under the run's work dir:
//!
//! ```text
//! <work_dir>/<id>/
//! ├── script.sh
//! ├── evidence/
//! └── artifacts/
//! ```
//!
//! Workspaces are never reused and never cleaned up here; the run's work
//! dir owns them.

mod id;

pub use id::{SequentialGenerator, UuidGenerator, WorkspaceId, WorkspaceIdGenerator};

use crate::error::{Result, ShellStepError};
use std::fs;
use std::path::{Path, PathBuf};

/// File the script text is written to.
pub const SCRIPT_FILE: &str = "script.sh";

/// Subdirectory scanned for artifacts.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Subdirectory scanned for evidence.
pub const EVIDENCE_DIR: &str = "evidence";

/// Layout of one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: WorkspaceId,
    root: PathBuf,
}

impl Workspace {
    /// Allocate and create a new workspace under `work_dir`.
    ///
    /// Creation is idempotent; an existing directory with the same name is
    /// reused rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `WorkspacePreparation` on any filesystem failure.
    pub fn create(work_dir: &Path, ids: &dyn WorkspaceIdGenerator) -> Result<Self> {
        let work_dir =
            std::path::absolute(work_dir).map_err(|source| ShellStepError::WorkspacePreparation {
                path: work_dir.to_path_buf(),
                source,
            })?;
        let id = ids.next_id();
        let workspace = Self {
            root: work_dir.join(id.as_str()),
            id,
        };

        for dir in [
            workspace.root.clone(),
            workspace.evidence_dir(),
            workspace.artifacts_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(|source| ShellStepError::WorkspacePreparation {
                path: dir.clone(),
                source,
            })?;
        }

        tracing::debug!("Created workspace {}", workspace.root.display());
        Ok(workspace)
    }

    /// Write the script text verbatim to `script.sh`.
    pub fn write_script(&self, script: &str) -> Result<PathBuf> {
        let path = self.script_path();
        fs::write(&path, script).map_err(|source| ShellStepError::WorkspacePreparation {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn id(&self) -> &WorkspaceId {
        &self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn script_path(&self) -> PathBuf {
        self.root.join(SCRIPT_FILE)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join(ARTIFACTS_DIR)
    }

    pub fn evidence_dir(&self) -> PathBuf {
        self.root.join(EVIDENCE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_builds_layout() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path(), &SequentialGenerator::new("ws")).unwrap();

        assert_eq!(ws.root(), temp.path().join("ws-1"));
        assert!(ws.artifacts_dir().is_dir());
        assert!(ws.evidence_dir().is_dir());
        assert_eq!(ws.id().as_str(), "ws-1");
    }

    #[test]
    fn create_creates_missing_work_dir() {
        let temp = TempDir::new().unwrap();
        let work_dir = temp.path().join("nested").join("run");

        let ws = Workspace::create(&work_dir, &UuidGenerator).unwrap();

        assert!(ws.root().starts_with(&work_dir));
        assert!(ws.evidence_dir().is_dir());
    }

    #[test]
    fn create_is_idempotent_for_existing_dirs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("same-1").join("artifacts")).unwrap();

        let ws = Workspace::create(temp.path(), &SequentialGenerator::new("same")).unwrap();
        assert!(ws.artifacts_dir().is_dir());
    }

    #[test]
    fn create_fails_when_work_dir_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "").unwrap();

        let err = Workspace::create(&file, &UuidGenerator).unwrap_err();
        assert!(matches!(err, ShellStepError::WorkspacePreparation { .. }));
    }

    #[test]
    fn successive_workspaces_are_distinct() {
        let temp = TempDir::new().unwrap();
        let a = Workspace::create(temp.path(), &UuidGenerator).unwrap();
        let b = Workspace::create(temp.path(), &UuidGenerator).unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn write_script_is_verbatim() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::create(temp.path(), &UuidGenerator).unwrap();
        let script = "#!/bin/sh\necho \"$NAME\"\n";

        let path = ws.write_script(script).unwrap();

        assert_eq!(path, ws.root().join("script.sh"));
        assert_eq!(fs::read_to_string(path).unwrap(), script);
    }
}
