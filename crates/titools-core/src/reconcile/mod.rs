//! Desired-state reconciliation for skills, agents, and platform links.
//!
//! Every primitive is idempotent and fail-soft per item: one artifact
//! failing never aborts the rest, and removing something already absent
//! is "nothing to do", not an error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::catalog;
use crate::fs::{LinkOutcome, copy_tree, link_or_copy, remove_path};
use crate::paths;
use crate::platform;
use crate::types::{ArtifactFilter, OperationResult, Scope};

/// How entries are matched and deleted by [`remove_entries`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Appended to each name when building the on-disk entry name.
    pub suffix: Option<&'static str>,
    /// Delete directories recursively; agents are plain files.
    pub recursive: bool,
}

/// Per-skill outcome of a platform link pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub linked: Vec<String>,
    pub copied: Vec<String>,
    pub failed: Vec<String>,
}

impl LinkReport {
    /// Skills the platform can now resolve, by link or by copy.
    pub fn delivered(&self) -> usize {
        self.linked.len() + self.copied.len()
    }
}

/// Remove each named entry from `dir`, skipping absent ones.
///
/// The existence check uses a non-following stat so broken symlinks are
/// still found and deleted. Failures are recorded per item and do not
/// stop the loop.
pub fn remove_entries(dir: &Path, names: &[&str], options: RemoveOptions) -> OperationResult {
    let mut result = OperationResult::default();
    if !dir.exists() {
        return result;
    }

    for name in names {
        let entry = match options.suffix {
            Some(suffix) => dir.join(format!("{name}{suffix}")),
            None => dir.join(name),
        };
        match fs::symlink_metadata(&entry) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(entry = %entry.display(), "nothing to remove");
            }
            Err(err) => {
                warn!(entry = %entry.display(), %err, "failed to stat entry");
                result.failed.push((*name).to_string());
            }
            Ok(meta) => {
                let removed = if meta.is_dir() && options.recursive {
                    fs::remove_dir_all(&entry)
                } else if meta.is_dir() {
                    fs::remove_dir(&entry)
                } else {
                    fs::remove_file(&entry)
                };
                match removed {
                    Ok(()) => result.removed.push((*name).to_string()),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(err) => {
                        warn!(entry = %entry.display(), %err, "failed to remove entry");
                        result.failed.push((*name).to_string());
                    }
                }
            }
        }
    }

    result
}

/// Remove skill directories at a scope for the given catalog slice.
pub fn remove_skills(scope: &Scope, filter: ArtifactFilter) -> OperationResult {
    remove_entries(
        &paths::skills_dir(scope),
        &catalog::skills(filter),
        RemoveOptions {
            suffix: None,
            recursive: true,
        },
    )
}

/// Remove agent files at a scope for the given catalog slice.
pub fn remove_agents(scope: &Scope, filter: ArtifactFilter) -> OperationResult {
    remove_entries(
        &paths::agents_dir(scope),
        &catalog::agents(filter),
        RemoveOptions {
            suffix: Some(".md"),
            recursive: false,
        },
    )
}

/// Remove skill links from a platform's link directory.
pub fn remove_skill_links(platform_link_dir: &Path, filter: ArtifactFilter) -> OperationResult {
    remove_entries(
        platform_link_dir,
        &catalog::skills(filter),
        RemoveOptions {
            suffix: None,
            recursive: true,
        },
    )
}

/// Copy one skill bundle from `source_root/skills/<name>` into the
/// scope's skills directory, replacing any existing copy.
///
/// `Ok(false)` means the source tree does not ship this skill, which is
/// the normal signal, not an error.
pub fn install_skill(source_root: &Path, name: &str, scope: &Scope) -> anyhow::Result<bool> {
    let src = source_root.join("skills").join(name);
    if !src.exists() {
        return Ok(false);
    }

    let skills_dir = paths::skills_dir(scope);
    fs::create_dir_all(&skills_dir)
        .with_context(|| format!("Failed to create {}", skills_dir.display()))?;

    let dest = skills_dir.join(name);
    remove_path(&dest).with_context(|| format!("Failed to replace {}", dest.display()))?;
    copy_tree(&src, &dest)?;
    Ok(true)
}

/// Copy one agent definition from `source_root/agents/<name>.md` into
/// the scope's agents directory.
pub fn install_agent(source_root: &Path, name: &str, scope: &Scope) -> anyhow::Result<bool> {
    let src = source_root.join("agents").join(format!("{name}.md"));
    if !src.exists() {
        return Ok(false);
    }

    let agents_dir = paths::agents_dir(scope);
    fs::create_dir_all(&agents_dir)
        .with_context(|| format!("Failed to create {}", agents_dir.display()))?;

    let dest = agents_dir.join(format!("{name}.md"));
    remove_path(&dest).with_context(|| format!("Failed to replace {}", dest.display()))?;
    fs::copy(&src, &dest).with_context(|| {
        format!(
            "Failed to copy agent from {} to {}",
            src.display(),
            dest.display()
        )
    })?;
    Ok(true)
}

/// Create platform links for the given skills, pointing at the scope's
/// canonical skill directories.
///
/// Local-scope links use relative targets so the project tree stays
/// relocatable; global links are absolute. Hosts that refuse symlinks
/// get a recursive copy, reported separately as `copied`.
pub fn create_skill_links(
    platform_link_dir: &Path,
    skills: &[&str],
    scope: &Scope,
) -> LinkReport {
    let skills_dir = paths::skills_dir(scope);
    let relative = scope.is_local();
    let mut report = LinkReport::default();

    for skill in skills {
        let target = skills_dir.join(skill);
        let link_path = platform_link_dir.join(skill);
        match link_or_copy(&target, &link_path, relative) {
            LinkOutcome::Linked => report.linked.push((*skill).to_string()),
            LinkOutcome::CopiedFallback => {
                debug!(skill, link = %link_path.display(), "symlink unavailable, copied");
                report.copied.push((*skill).to_string());
            }
            LinkOutcome::Failed(reason) => {
                warn!(skill, %reason, "failed to link skill");
                report.failed.push((*skill).to_string());
            }
        }
    }

    report
}

/// Makes on-disk state at a target scope match the catalog.
///
/// Carries the global scope so the dual-scope legacy cleanup (a legacy
/// artifact installed globally must not linger once the tool operates
/// against a project, and vice versa) never reads the environment. The
/// non-target scope is only ever cleaned, never installed into.
#[derive(Debug, Clone)]
pub struct Reconciler {
    global: Scope,
}

impl Reconciler {
    pub fn new(home_dir: PathBuf) -> Self {
        Self {
            global: Scope::Global(home_dir),
        }
    }

    pub fn global_scope(&self) -> &Scope {
        &self.global
    }

    /// Remove legacy skills at both scopes, then install every current
    /// skill from `source_root`, recording per-item success/failure.
    pub fn install_skills(&self, source_root: &Path, scope: &Scope) -> OperationResult {
        let mut result = remove_skills(scope, ArtifactFilter::LegacyOnly);
        if scope != &self.global {
            result.merge(remove_skills(&self.global, ArtifactFilter::LegacyOnly));
        }

        for name in catalog::skills(ArtifactFilter::CurrentOnly) {
            match install_skill(source_root, name, scope) {
                Ok(true) => result.installed.push(name.to_string()),
                Ok(false) => result.failed.push(name.to_string()),
                Err(err) => {
                    warn!(skill = name, %err, "failed to install skill");
                    result.failed.push(name.to_string());
                }
            }
        }

        result
    }

    /// Counterpart of [`Reconciler::install_skills`] for agents.
    pub fn install_agents(&self, source_root: &Path, scope: &Scope) -> OperationResult {
        let mut result = remove_agents(scope, ArtifactFilter::LegacyOnly);
        if scope != &self.global {
            result.merge(remove_agents(&self.global, ArtifactFilter::LegacyOnly));
        }

        for name in catalog::agents(ArtifactFilter::CurrentOnly) {
            match install_agent(source_root, name, scope) {
                Ok(true) => result.installed.push(name.to_string()),
                Ok(false) => result.failed.push(name.to_string()),
                Err(err) => {
                    warn!(agent = name, %err, "failed to install agent");
                    result.failed.push(name.to_string());
                }
            }
        }

        result
    }

    /// Install every current skill and agent at the scope.
    pub fn install_all(&self, source_root: &Path, scope: &Scope) -> OperationResult {
        let mut result = self.install_skills(source_root, scope);
        result.merge(self.install_agents(source_root, scope));
        result
    }

    /// Purge every legacy skill, agent, and platform link at the scope
    /// (and, for a local scope, at the global scope too).
    pub fn cleanup_legacy_artifacts(&self, scope: &Scope) -> OperationResult {
        let mut result = remove_skills(scope, ArtifactFilter::LegacyOnly);
        result.merge(remove_agents(scope, ArtifactFilter::LegacyOnly));
        for platform in platform::detect_platforms(scope) {
            result.merge(remove_skill_links(
                &platform.skills_link_dir,
                ArtifactFilter::LegacyOnly,
            ));
        }

        if scope != &self.global {
            result.merge(remove_skills(&self.global, ArtifactFilter::LegacyOnly));
            result.merge(remove_agents(&self.global, ArtifactFilter::LegacyOnly));
            for platform in platform::detect_platforms(&self.global) {
                result.merge(remove_skill_links(
                    &platform.skills_link_dir,
                    ArtifactFilter::LegacyOnly,
                ));
            }
        }

        result
    }
}
