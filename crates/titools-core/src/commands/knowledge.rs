//! Knowledge index synchronization for project instruction files.
//!
//! Maintains the managed knowledge block in `AGENTS.md`, `CLAUDE.md`,
//! and `GEMINI.md`: selected files get the block added or updated,
//! deselected files that carry a block get it removed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::catalog::{self, KNOWLEDGE_FILES};
use crate::commands::PreconditionError;
use crate::knowledge;
use crate::types::{ArtifactFilter, Scope};
use crate::{paths, project};

/// Which instruction files to sync.
#[derive(Debug, Clone)]
pub enum KnowledgeSelection {
    /// Explicit file names (from the interactive prompt).
    Files(Vec<String>),
    /// Files already carrying a block; falls back to `CLAUDE.md` when
    /// none does.
    Forced,
    /// Files that already exist on disk, forced.
    OnlyExisting,
}

/// Observed state of one candidate instruction file.
#[derive(Debug, Clone)]
pub struct FileState {
    pub name: String,
    pub exists: bool,
    pub has_block: bool,
}

#[derive(Debug, Clone)]
pub struct KnowledgeSyncOptions {
    pub project_dir: PathBuf,
    pub selection: KnowledgeSelection,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeSyncReport {
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

impl KnowledgeSyncReport {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty() || !self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeSyncCommand {
    home_dir: PathBuf,
}

impl KnowledgeSyncCommand {
    pub fn new(home_dir: PathBuf) -> Self {
        Self { home_dir }
    }

    /// Observed state of every candidate file, in processing order.
    pub fn file_states(&self, project_dir: &Path) -> Vec<FileState> {
        KNOWLEDGE_FILES
            .iter()
            .map(|name| {
                let path = project_dir.join(name);
                FileState {
                    name: (*name).to_string(),
                    exists: path.exists(),
                    has_block: knowledge::block_exists(&path),
                }
            })
            .collect()
    }

    /// Whether any current skill is installed where this project could
    /// see it: the global skills directory or one of the project-local
    /// platform directories.
    pub fn skills_installed(&self, project_dir: &Path) -> bool {
        let global = Scope::Global(self.home_dir.clone());
        if has_any_current_skill(&paths::skills_dir(&global)) {
            return true;
        }
        local_skills_dirs(project_dir)
            .iter()
            .any(|(_, dir)| has_any_current_skill(dir))
    }

    pub fn execute(
        &self,
        options: &KnowledgeSyncOptions,
    ) -> anyhow::Result<KnowledgeSyncReport> {
        let project_dir = &options.project_dir;
        if !project::is_titanium_project(project_dir) {
            return Err(PreconditionError::NotATitaniumProject(project_dir.clone()).into());
        }
        if !self.skills_installed(project_dir) {
            return Err(PreconditionError::SkillsNotInstalled.into());
        }

        let states = self.file_states(project_dir);
        let selected = resolve_selection(&options.selection, &states);

        let mut report = KnowledgeSyncReport::default();
        for state in &states {
            let path = project_dir.join(&state.name);
            if selected.iter().any(|name| name == &state.name) {
                match self.sync_file(project_dir, &state.name, &path, state.exists) {
                    Ok(()) => report.updated.push(state.name.clone()),
                    Err(err) => {
                        warn!(file = %state.name, %err, "failed to sync knowledge index");
                        report.failed.push(state.name.clone());
                    }
                }
            } else if state.has_block {
                match knowledge::remove_old_block(&path) {
                    Ok(()) => report.removed.push(state.name.clone()),
                    Err(err) => {
                        warn!(file = %state.name, %err, "failed to clean knowledge index");
                        report.failed.push(state.name.clone());
                    }
                }
            }
        }

        Ok(report)
    }

    fn sync_file(
        &self,
        project_dir: &Path,
        name: &str,
        path: &Path,
        existed: bool,
    ) -> anyhow::Result<()> {
        if !existed && !path.exists() {
            fs::write(path, format!("# {name}\n\n"))?;
        }
        let root = skills_root_for(project_dir, name);
        knowledge::add_or_update_block(path, &knowledge::render_block(&root))
    }
}

fn resolve_selection(selection: &KnowledgeSelection, states: &[FileState]) -> Vec<String> {
    match selection {
        KnowledgeSelection::Files(names) => names.clone(),
        KnowledgeSelection::OnlyExisting => states
            .iter()
            .filter(|state| state.exists)
            .map(|state| state.name.clone())
            .collect(),
        KnowledgeSelection::Forced => {
            let with_block: Vec<String> = states
                .iter()
                .filter(|state| state.has_block)
                .map(|state| state.name.clone())
                .collect();
            if with_block.is_empty() {
                vec!["CLAUDE.md".to_string()]
            } else {
                with_block
            }
        }
    }
}

/// The per-file platform skills directory inside the project.
fn local_skills_dirs(project_dir: &Path) -> Vec<(&'static str, PathBuf)> {
    vec![
        ("AGENTS.md", project_dir.join(".agents").join("skills")),
        ("CLAUDE.md", project_dir.join(".claude").join("skills")),
        ("GEMINI.md", project_dir.join(".gemini").join("skills")),
    ]
}

/// The skills root path rendered into a file's knowledge block: the
/// project-local platform directory when it exists, else the matching
/// global one.
fn skills_root_for(project_dir: &Path, name: &str) -> String {
    if let Some((_, dir)) = local_skills_dirs(project_dir)
        .into_iter()
        .find(|(file, _)| *file == name)
        && dir.exists()
    {
        return match name {
            "CLAUDE.md" => "./.claude/skills".to_string(),
            "GEMINI.md" => "./.gemini/skills".to_string(),
            _ => "./.agents/skills".to_string(),
        };
    }
    match name {
        "CLAUDE.md" => "~/.claude/skills".to_string(),
        "GEMINI.md" => "~/.gemini/skills".to_string(),
        _ => "~/.agents/skills".to_string(),
    }
}

fn has_any_current_skill(skills_dir: &Path) -> bool {
    catalog::skills(ArtifactFilter::CurrentOnly)
        .iter()
        .any(|skill| skills_dir.join(skill).exists())
}
