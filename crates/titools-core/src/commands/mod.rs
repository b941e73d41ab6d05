//! Command orchestration.
//!
//! Each command is a struct constructed with explicit paths (the CLI
//! resolves the home directory exactly once) plus an `Options` input and
//! a `Report` output, so frontends only render results.

pub mod knowledge;
pub mod sync_skills;
pub mod uninstall;
pub mod update;

use std::path::PathBuf;

pub use knowledge::{
    FileState, KnowledgeSelection, KnowledgeSyncCommand, KnowledgeSyncOptions,
    KnowledgeSyncReport,
};
pub use sync_skills::{
    PlatformSelection, SkillSource, SyncSkillsCommand, SyncSkillsOptions, SyncSkillsReport,
};
pub use uninstall::{
    UninstallCommand, UninstallInventory, UninstallOptions, UninstallReport, UninstallTarget,
};
pub use update::{UpdateCommand, UpdateOptions, UpdateReport, UpdateStatus};

/// Failures that invalidate a whole command before any state is touched.
///
/// The CLI maps these to exit code 1; everything else that goes wrong is
/// recorded per item and reported in the summary.
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    #[error("Not a Titanium project (no tiapp.xml) at {}", .0.display())]
    NotATitaniumProject(PathBuf),
    #[error("Skills not installed")]
    SkillsNotInstalled,
    #[error("No AI coding assistants detected")]
    NoPlatformsDetected,
}
