//! Shared core types used across the reconciliation and command layers.

use std::path::{Path, PathBuf};

/// Installation target scope.
///
/// Resolved exactly once at the command layer and threaded explicitly
/// through every path-resolution and reconciliation call; core logic
/// never consults the environment for a home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Rooted at the user's home directory.
    Global(PathBuf),
    /// Rooted at a project directory.
    Local(PathBuf),
}

impl Scope {
    /// The directory all scope-relative paths resolve under.
    pub fn base(&self) -> &Path {
        match self {
            Scope::Global(dir) | Scope::Local(dir) => dir,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Scope::Local(_))
    }
}

/// Which slice of the artifact catalog an operation applies to.
///
/// `LegacyOnly` exists as its own variant so legacy cleanup cannot touch
/// a current artifact by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFilter {
    /// Current and legacy names.
    All,
    /// Only actively shipped names.
    CurrentOnly,
    /// Only retired names, kept for removal.
    LegacyOnly,
}

/// Aggregate outcome of a reconciliation pass.
///
/// Additive: callers merge the results of sub-operations into one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub installed: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl OperationResult {
    pub fn merge(&mut self, other: OperationResult) {
        self.installed.extend(other.installed);
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
