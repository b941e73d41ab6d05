//! Uninstall command: selective removal of managed artifacts.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::catalog;
use crate::commands::knowledge::KnowledgeSyncCommand;
use crate::knowledge;
use crate::platform;
use crate::project;
use crate::reconcile::{remove_agents, remove_skill_links, remove_skills};
use crate::types::{ArtifactFilter, OperationResult, Scope};
use crate::paths;

/// One removable class of managed artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallTarget {
    /// Agent files from home and (when in a project) the project.
    Agents,
    /// Knowledge blocks inside the project's instruction files.
    Knowledge,
    SkillsHome,
    SkillsProject,
    LinksHome,
    LinksProject,
}

/// What actually exists on disk, used to build the interactive choice
/// list (absent classes are not offered).
#[derive(Debug, Clone, Default)]
pub struct UninstallInventory {
    pub home_skills: bool,
    pub project_skills: bool,
    pub agents: bool,
    pub home_links: bool,
    pub project_links: bool,
    pub knowledge_blocks: bool,
}

impl UninstallInventory {
    pub fn is_empty(&self) -> bool {
        !(self.home_skills
            || self.project_skills
            || self.agents
            || self.home_links
            || self.project_links
            || self.knowledge_blocks)
    }
}

#[derive(Debug, Clone)]
pub struct UninstallOptions {
    pub project_dir: PathBuf,
    pub targets: Vec<UninstallTarget>,
}

#[derive(Debug, Default)]
pub struct UninstallReport {
    pub skills: OperationResult,
    pub agents: OperationResult,
    /// Per platform (display name), links removed.
    pub links: Vec<(String, OperationResult)>,
    /// Instruction files whose knowledge block was removed.
    pub knowledge_cleaned: Vec<String>,
}

impl UninstallReport {
    pub fn changed(&self) -> bool {
        !self.skills.removed.is_empty()
            || !self.agents.removed.is_empty()
            || !self.knowledge_cleaned.is_empty()
            || self.links.iter().any(|(_, r)| !r.removed.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct UninstallCommand {
    home_dir: PathBuf,
}

impl UninstallCommand {
    pub fn new(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// Probe both scopes for anything this command could remove.
    pub fn inventory(&self, project_dir: &Path) -> UninstallInventory {
        let global = Scope::Global(self.home_dir.clone());
        let local = Scope::Local(project_dir.to_path_buf());
        let is_project = project::is_titanium_project(project_dir);

        let skill_names = catalog::skills(ArtifactFilter::All);
        let agent_files: Vec<String> = catalog::agents(ArtifactFilter::All)
            .iter()
            .map(|name| format!("{name}.md"))
            .collect();
        let agent_names: Vec<&str> = agent_files.iter().map(String::as_str).collect();

        let has_links = |scope: &Scope| {
            platform::detect_platforms(scope)
                .iter()
                .any(|p| has_any(&p.skills_link_dir, &skill_names))
        };

        UninstallInventory {
            home_skills: has_any(&paths::skills_dir(&global), &skill_names),
            project_skills: is_project && has_any(&paths::skills_dir(&local), &skill_names),
            agents: has_any(&paths::agents_dir(&global), &agent_names)
                || (is_project && has_any(&paths::agents_dir(&local), &agent_names)),
            home_links: has_links(&global),
            project_links: is_project && has_links(&local),
            knowledge_blocks: is_project
                && KnowledgeSyncCommand::new(self.home_dir.clone())
                    .file_states(project_dir)
                    .iter()
                    .any(|state| state.has_block),
        }
    }

    pub fn execute(&self, options: &UninstallOptions) -> UninstallReport {
        let global = Scope::Global(self.home_dir.clone());
        let local = Scope::Local(options.project_dir.clone());
        let is_project = project::is_titanium_project(&options.project_dir);
        let mut report = UninstallReport::default();

        for target in &options.targets {
            match target {
                UninstallTarget::LinksHome => {
                    for platform in platform::detect_platforms(&global) {
                        let removed =
                            remove_skill_links(&platform.skills_link_dir, ArtifactFilter::All);
                        report
                            .links
                            .push((platform.display_name.to_string(), removed));
                    }
                }
                UninstallTarget::LinksProject => {
                    for platform in platform::detect_platforms(&local) {
                        let removed =
                            remove_skill_links(&platform.skills_link_dir, ArtifactFilter::All);
                        report
                            .links
                            .push((platform.display_name.to_string(), removed));
                    }
                }
                UninstallTarget::SkillsHome => {
                    report
                        .skills
                        .merge(remove_skills(&global, ArtifactFilter::All));
                }
                UninstallTarget::SkillsProject => {
                    report
                        .skills
                        .merge(remove_skills(&local, ArtifactFilter::All));
                }
                UninstallTarget::Agents => {
                    report
                        .agents
                        .merge(remove_agents(&global, ArtifactFilter::All));
                    if is_project {
                        report
                            .agents
                            .merge(remove_agents(&local, ArtifactFilter::All));
                    }
                }
                UninstallTarget::Knowledge => {
                    if !is_project {
                        continue;
                    }
                    for name in catalog::KNOWLEDGE_FILES {
                        let path = options.project_dir.join(name);
                        if !knowledge::block_exists(&path) {
                            continue;
                        }
                        match knowledge::remove_old_block(&path) {
                            Ok(()) => report.knowledge_cleaned.push((*name).to_string()),
                            Err(err) => {
                                warn!(file = name, %err, "failed to remove knowledge index");
                            }
                        }
                    }
                }
            }
        }

        report
    }
}

fn has_any(dir: &Path, names: &[&str]) -> bool {
    dir.exists() && names.iter().any(|name| dir.join(name).exists())
}
