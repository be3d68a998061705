//! Workspace identifier generation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// A workspace directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Generate a random (uuid v4) workspace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh workspace IDs.
pub trait WorkspaceIdGenerator: Send + Sync {
    fn next_id(&self) -> WorkspaceId;
}

/// Random uuid v4 IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl WorkspaceIdGenerator for UuidGenerator {
    fn next_id(&self) -> WorkspaceId {
        WorkspaceId::new()
    }
}

/// Deterministic `{prefix}-{n}` IDs, starting at 1.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl WorkspaceIdGenerator for SequentialGenerator {
    fn next_id(&self) -> WorkspaceId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        WorkspaceId(format!("{}-{}", self.prefix, n))
    }
}
