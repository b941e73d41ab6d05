//! AI coding assistant platform descriptors and detection.

use std::path::PathBuf;

use crate::paths;
use crate::types::Scope;

/// One of the supported AI coding assistants, with its directories
/// resolved for a concrete scope.
///
/// Recomputed on every invocation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Where the platform reads skill links from.
    pub skills_link_dir: PathBuf,
    /// Existence of this directory is the sole "installed" signal.
    pub config_dir: PathBuf,
}

const PLATFORM_NAMES: &[(&str, &str)] = &[
    ("claude", "Claude Code"),
    ("gemini", "Gemini CLI"),
    ("codex", "Codex CLI"),
];

/// All supported platforms, resolved against a scope.
pub fn known_platforms(scope: &Scope) -> Vec<PlatformDescriptor> {
    PLATFORM_NAMES
        .iter()
        .map(|&(name, display_name)| PlatformDescriptor {
            name,
            display_name,
            skills_link_dir: paths::platform_skills_dir(scope, name),
            config_dir: paths::platform_config_dir(scope, name),
        })
        .collect()
}

/// Platforms whose configuration directory exists at the scope.
pub fn detect_platforms(scope: &Scope) -> Vec<PlatformDescriptor> {
    known_platforms(scope)
        .into_iter()
        .filter(|platform| platform.config_dir.exists())
        .collect()
}

pub fn platform_by_name(scope: &Scope, name: &str) -> Option<PlatformDescriptor> {
    known_platforms(scope)
        .into_iter()
        .find(|platform| platform.name == name)
}

/// Host operating system, used only for user-facing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Linux,
    Windows,
}

pub fn host_os() -> HostOs {
    if cfg!(target_os = "macos") {
        HostOs::MacOs
    } else if cfg!(windows) {
        HostOs::Windows
    } else {
        HostOs::Linux
    }
}
