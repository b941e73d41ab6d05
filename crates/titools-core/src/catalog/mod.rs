//! Artifact catalog: the declared desired state for skills and agents.
//!
//! Single source of truth for the shipped skill/agent names, the legacy
//! names retained only for removal, and the repository constants.

use crate::types::ArtifactFilter;

/// Skill bundles actively shipped by the current release.
pub const SKILLS: &[&str] = &[
    "ti-expert",
    "purgetss",
    "ti-ui",
    "ti-howtos",
    "ti-guides",
    "alloy-guides",
    "alloy-howtos",
];

/// Skill names from previous releases, removed on sync/update.
pub const LEGACY_SKILLS: &[&str] = &["alloy-expert"];

/// Agents actively shipped by the current release.
pub const AGENTS: &[&str] = &["ti-pro"];

/// Agent names from previous releases, removed on sync/update.
pub const LEGACY_AGENTS: &[&str] = &["ti-researcher"];

/// Managed block delimiters inside instruction files. Exact literal lines.
pub const BLOCK_START: &str = "<!-- TITANIUM-KNOWLEDGE-START -->";
pub const BLOCK_END: &str = "<!-- TITANIUM-KNOWLEDGE-END -->";

/// File marking a directory as a Titanium project.
pub const PROJECT_MARKER: &str = "tiapp.xml";

/// Instruction files the knowledge block may live in, in processing
/// order.
pub const KNOWLEDGE_FILES: &[&str] = &["AGENTS.md", "CLAUDE.md", "GEMINI.md"];

pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REPO_URL: &str = "https://github.com/macCesar/titools";
pub const REPO_API_URL: &str = "https://api.github.com/repos/macCesar/titools";

/// Version string stamped into the generated knowledge block.
pub fn knowledge_version() -> String {
    format!("v{PACKAGE_VERSION}")
}

/// Skill names for a filter, in declaration order.
pub fn skills(filter: ArtifactFilter) -> Vec<&'static str> {
    select(SKILLS, LEGACY_SKILLS, filter)
}

/// Agent names for a filter, in declaration order.
pub fn agents(filter: ArtifactFilter) -> Vec<&'static str> {
    select(AGENTS, LEGACY_AGENTS, filter)
}

fn select(
    current: &[&'static str],
    legacy: &[&'static str],
    filter: ArtifactFilter,
) -> Vec<&'static str> {
    match filter {
        ArtifactFilter::All => current.iter().chain(legacy).copied().collect(),
        ArtifactFilter::CurrentOnly => current.to_vec(),
        ArtifactFilter::LegacyOnly => legacy.to_vec(),
    }
}
