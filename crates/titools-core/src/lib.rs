//! Titools Core Library
//!
//! Provides the domain logic for managing Titanium SDK skill bundles,
//! platform agents, and knowledge index blocks across AI coding
//! assistant installations at global and project scope.

pub mod catalog;
pub mod commands;
pub mod fetch;
pub mod fs;
pub mod knowledge;
pub mod paths;
pub mod platform;
pub mod project;
pub mod reconcile;
pub mod types;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Scopes and results
    pub use crate::types::{ArtifactFilter, OperationResult, Scope};

    // Platforms
    pub use crate::platform::{PlatformDescriptor, detect_platforms, known_platforms};

    // Reconciliation
    pub use crate::reconcile::{LinkReport, Reconciler, RemoveOptions, remove_entries};

    // Filesystem
    pub use crate::fs::LinkOutcome;

    // Commands
    pub use crate::commands::{
        KnowledgeSelection, KnowledgeSyncCommand, PlatformSelection, PreconditionError,
        SkillSource, SyncSkillsCommand, UninstallCommand, UpdateCommand,
    };
}
