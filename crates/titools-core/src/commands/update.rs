//! Update command: refresh installed skill bundles and agents to the
//! latest published release.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::info;

use crate::catalog::{self, PACKAGE_VERSION};
use crate::commands::PreconditionError;
use crate::fetch::ArchiveFetcher;
use crate::platform;
use crate::reconcile::{LinkReport, Reconciler, create_skill_links};
use crate::types::{ArtifactFilter, OperationResult, Scope};
use crate::paths;

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub scope: Scope,
}

#[derive(Debug)]
pub enum UpdateStatus {
    /// Nothing newer published; legacy cleanup still ran.
    UpToDate,
    Updated {
        skills: OperationResult,
        agents: OperationResult,
        links: Vec<(String, LinkReport)>,
    },
}

#[derive(Debug)]
pub struct UpdateReport {
    pub status: UpdateStatus,
    /// Legacy artifacts removed during cleanup (both branches).
    pub cleanup: OperationResult,
}

#[derive(Debug, Clone)]
pub struct UpdateCommand {
    home_dir: PathBuf,
}

impl UpdateCommand {
    pub fn new(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// Whether any current skill is present at the scope.
    pub fn skills_installed(&self, scope: &Scope) -> bool {
        let skills_dir = paths::skills_dir(scope);
        catalog::skills(ArtifactFilter::CurrentOnly)
            .iter()
            .any(|skill| skills_dir.join(skill).exists())
    }

    pub async fn execute(&self, options: &UpdateOptions) -> anyhow::Result<UpdateReport> {
        let scope = &options.scope;
        if !self.skills_installed(scope) {
            return Err(PreconditionError::SkillsNotInstalled.into());
        }

        let fetcher = ArchiveFetcher::new()?;
        let reconciler = Reconciler::new(self.home_dir.clone());

        if !fetcher.check_for_update(PACKAGE_VERSION).await {
            info!(version = PACKAGE_VERSION, "already up to date");
            let cleanup = reconciler.cleanup_legacy_artifacts(scope);
            return Ok(UpdateReport {
                status: UpdateStatus::UpToDate,
                cleanup,
            });
        }

        let staging = self.download(&fetcher).await?;
        let source_root = staging.path();

        let skills = reconciler.install_skills(source_root, scope);
        let agents = reconciler.install_agents(source_root, scope);
        let cleanup = reconciler.cleanup_legacy_artifacts(scope);

        let current_skills = catalog::skills(ArtifactFilter::CurrentOnly);
        let mut links = Vec::new();
        for platform in platform::detect_platforms(scope) {
            let report = create_skill_links(&platform.skills_link_dir, &current_skills, scope);
            links.push((platform.display_name.to_string(), report));
        }

        Ok(UpdateReport {
            status: UpdateStatus::Updated {
                skills,
                agents,
                links,
            },
            cleanup,
        })
    }

    async fn download(&self, fetcher: &ArchiveFetcher) -> anyhow::Result<TempDir> {
        let staging =
            tempfile::tempdir().context("Failed to create download staging directory")?;
        fetcher.download_archive(staging.path(), "main").await?;
        Ok(staging)
    }
}

/// Scope the update applies to when the user did not say: prefer the
/// project when it is the only place skills are installed.
pub fn preferred_update_scope(home_dir: &Path, project_dir: &Path) -> Option<Scope> {
    let command = UpdateCommand::new(home_dir.to_path_buf());
    let local = Scope::Local(project_dir.to_path_buf());
    let global = Scope::Global(home_dir.to_path_buf());

    let has_local = command.skills_installed(&local);
    let has_global = command.skills_installed(&global);
    match (has_local, has_global) {
        (true, false) => Some(local),
        _ => None,
    }
}
