//! Skills install/sync command.
//!
//! Per invocation: resolve the scope, detect platforms, apply the
//! platform selection, then either install + link or (for an empty
//! selection) remove every managed artifact at the scope. All
//! destructive work happens after selection is finalized.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::info;

use crate::catalog;
use crate::commands::PreconditionError;
use crate::fetch::ArchiveFetcher;
use crate::platform::{self, PlatformDescriptor};
use crate::reconcile::{
    LinkReport, Reconciler, create_skill_links, remove_agents, remove_skill_links, remove_skills,
};
use crate::types::{ArtifactFilter, OperationResult, Scope};

/// Where the skill bundles come from.
#[derive(Debug, Clone)]
pub enum SkillSource {
    /// An already-extracted source tree (development checkouts, tests).
    LocalTree(PathBuf),
    /// Download the published archive.
    Remote,
}

/// Which platforms the sync applies to.
#[derive(Debug, Clone)]
pub enum PlatformSelection {
    /// Every candidate platform, without prompting.
    All,
    /// Platform names chosen interactively. Empty means "uninstall from
    /// this scope".
    Named(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SyncSkillsOptions {
    pub scope: Scope,
    pub selection: PlatformSelection,
    pub source: SkillSource,
}

#[derive(Debug, Default)]
pub struct SyncSkillsReport {
    /// The empty-selection degradation: nothing was installed, managed
    /// artifacts at the scope were removed instead.
    pub remove_only: bool,
    pub skills: OperationResult,
    pub agents: OperationResult,
    /// Per selected platform (display name), the link pass outcome.
    pub links: Vec<(String, LinkReport)>,
    /// Per deselected platform (display name), what was unlinked.
    pub unlinked: Vec<(String, OperationResult)>,
}

#[derive(Debug)]
enum ResolvedSource {
    Tree(PathBuf),
    /// Downloaded archive; the staging directory is removed on drop.
    Staged(TempDir),
}

impl ResolvedSource {
    fn path(&self) -> &Path {
        match self {
            ResolvedSource::Tree(dir) => dir,
            ResolvedSource::Staged(tmp) => tmp.path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncSkillsCommand {
    home_dir: PathBuf,
}

impl SyncSkillsCommand {
    pub fn new(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// Platforms a sync at this scope can target.
    ///
    /// For a local scope, platforms detected globally but not in the
    /// project still count as candidates (with project-local
    /// directories), so a fresh project can be linked for an assistant
    /// the user only installed globally. For a global scope with nothing
    /// detected the command cannot proceed.
    pub fn candidate_platforms(
        &self,
        scope: &Scope,
    ) -> Result<Vec<PlatformDescriptor>, PreconditionError> {
        let detected = platform::detect_platforms(scope);

        if scope.is_global() {
            if detected.is_empty() {
                return Err(PreconditionError::NoPlatformsDetected);
            }
            return Ok(detected);
        }

        let global_scope = Scope::Global(self.home_dir.clone());
        let global_names: HashSet<&str> = platform::detect_platforms(&global_scope)
            .iter()
            .map(|p| p.name)
            .collect();
        let local_names: HashSet<&str> = detected.iter().map(|p| p.name).collect();

        let mut merged = detected;
        for candidate in platform::known_platforms(scope) {
            if global_names.contains(candidate.name) && !local_names.contains(candidate.name) {
                merged.push(candidate);
            }
        }
        if merged.is_empty() {
            // Nothing detected anywhere: a local install may still
            // target any platform.
            merged = platform::known_platforms(scope);
        }
        Ok(merged)
    }

    pub async fn execute(&self, options: &SyncSkillsOptions) -> anyhow::Result<SyncSkillsReport> {
        let scope = &options.scope;
        let candidates = self.candidate_platforms(scope)?;

        let selected: Vec<PlatformDescriptor> = match &options.selection {
            PlatformSelection::All => candidates.clone(),
            PlatformSelection::Named(names) => candidates
                .iter()
                .filter(|p| names.iter().any(|name| name == p.name))
                .cloned()
                .collect(),
        };

        let mut report = SyncSkillsReport {
            remove_only: selected.is_empty(),
            ..SyncSkillsReport::default()
        };

        if report.remove_only {
            info!("no platforms selected, removing managed artifacts");
            report.skills = remove_skills(scope, ArtifactFilter::All);
            report.agents = remove_agents(scope, ArtifactFilter::All);
            for candidate in &candidates {
                let unlinked =
                    remove_skill_links(&candidate.skills_link_dir, ArtifactFilter::All);
                report
                    .unlinked
                    .push((candidate.display_name.to_string(), unlinked));
            }
            return Ok(report);
        }

        // Removal-only flows above never touch the network.
        let source = self.resolve_source(&options.source).await?;
        let source_root = source.path();

        let reconciler = Reconciler::new(self.home_dir.clone());
        report.skills = reconciler.install_skills(source_root, scope);

        // Agents are only meaningful to Claude Code; deselecting it
        // uninstalls them.
        let claude_selected = selected.iter().any(|p| p.name == "claude");
        report.agents = if claude_selected {
            reconciler.install_agents(source_root, scope)
        } else {
            remove_agents(scope, ArtifactFilter::All)
        };

        let current_skills = catalog::skills(ArtifactFilter::CurrentOnly);
        for platform in &selected {
            remove_skill_links(&platform.skills_link_dir, ArtifactFilter::LegacyOnly);
            let links = create_skill_links(&platform.skills_link_dir, &current_skills, scope);
            report.links.push((platform.display_name.to_string(), links));
        }

        let selected_names: HashSet<&str> = selected.iter().map(|p| p.name).collect();
        for candidate in &candidates {
            if selected_names.contains(candidate.name) {
                continue;
            }
            let unlinked = remove_skill_links(&candidate.skills_link_dir, ArtifactFilter::All);
            report
                .unlinked
                .push((candidate.display_name.to_string(), unlinked));
        }

        Ok(report)
    }

    async fn resolve_source(&self, source: &SkillSource) -> anyhow::Result<ResolvedSource> {
        match source {
            SkillSource::LocalTree(dir) => Ok(ResolvedSource::Tree(dir.clone())),
            SkillSource::Remote => {
                let staging =
                    tempfile::tempdir().context("Failed to create download staging directory")?;
                ArchiveFetcher::new()?
                    .download_archive(staging.path(), "main")
                    .await?;
                Ok(ResolvedSource::Staged(staging))
            }
        }
    }
}
