//! titools - Titanium SDK Knowledge CLI
//!
//! Usage:
//!   titools install   # Install skill bundles and platform links
//!   titools sync      # Sync knowledge index files in a project
//!   titools update    # Refresh to the latest published release
//!   titools remove    # Uninstall managed artifacts

mod interactive;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use titools_core::catalog;
use titools_core::commands::update::preferred_update_scope;
use titools_core::commands::{
    KnowledgeSelection, KnowledgeSyncCommand, KnowledgeSyncOptions, KnowledgeSyncReport,
    PlatformSelection, PreconditionError, SkillSource, SyncSkillsCommand, SyncSkillsOptions,
    SyncSkillsReport, UninstallCommand, UninstallOptions, UninstallTarget, UpdateCommand,
    UpdateOptions, UpdateStatus,
};
use titools_core::platform::{self, HostOs};
use titools_core::project;
use titools_core::types::{ArtifactFilter, Scope};

use crate::interactive::{Selection, select_many, select_one};

#[derive(Parser)]
#[command(name = "titools")]
#[command(version)]
#[command(about = "Titanium SDK Knowledge CLI - Manage skills and knowledge for AI coding assistants", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install Titanium knowledge packages and platform links
    Install {
        /// Install skills locally in the current project
        #[arg(short, long)]
        local: bool,

        /// Install all detected platforms without prompting
        #[arg(short, long)]
        all: bool,

        /// Install to a custom path (skips platform selection)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Sync knowledge index files (AGENTS.md/CLAUDE.md/GEMINI.md) in a Titanium project
    Sync {
        /// Project path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Update existing knowledge blocks without prompting
        #[arg(short, long)]
        force: bool,

        /// Show detailed diagnostics
        #[arg(short, long)]
        verbose: bool,
    },

    /// Update installed knowledge packages and agents (not the CLI)
    Update {
        /// Update local skills in the current project
        #[arg(short, long)]
        local: bool,
    },

    /// Remove Titanium knowledge packages and agents
    #[command(alias = "uninstall")]
    Remove {
        /// Remove local skills from the current project
        #[arg(short, long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "titools=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            if let Some(precondition) = err.downcast_ref::<PreconditionError>() {
                println!("{} {precondition}", style("Error:").red());
            } else {
                eprintln!("{} {err:#}", style("Error:").red());
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Install { local, all, path } => run_install(local, all, path).await,
        Commands::Sync {
            path,
            force,
            verbose,
        } => run_sync(&path, force, verbose),
        Commands::Update { local } => run_update(local).await,
        Commands::Remove { local } => run_remove(local),
    }
}

async fn run_install(local: bool, all: bool, path: Option<PathBuf>) -> Result<ExitCode> {
    println!();
    println!("{}", style("Titanium SDK Skills Manager").blue().bold());
    println!();

    let home = home_dir()?;
    let cwd = std::env::current_dir()?;

    let mut is_local = local;
    if !is_local && path.is_none() && project::is_titanium_project(&cwd) {
        let items = vec![
            "Global (user home) - Recommended for personal use".to_string(),
            "Local (current project) - Best for shared repositories".to_string(),
        ];
        match select_one(
            "Titanium project detected. Where do you want to install the skills",
            &items,
        )? {
            Selection::Chosen(index) => is_local = index == 1,
            Selection::Cancelled => return cancelled(),
        }
    }

    let scope = if is_local {
        println!("{}", style("Mode: Local installation (current project)").cyan());
        Scope::Local(cwd.clone())
    } else if let Some(custom) = path.as_ref() {
        let base = absolutize(&cwd, custom);
        println!(
            "{}",
            style(format!("Mode: Custom path ({})", base.display())).cyan()
        );
        Scope::Local(base)
    } else {
        println!("{}", style("Mode: Global installation (user home)").cyan());
        Scope::Global(home.clone())
    };
    println!();

    let command = SyncSkillsCommand::new(home);
    let candidates = match command.candidate_platforms(&scope) {
        Ok(candidates) => candidates,
        Err(PreconditionError::NoPlatformsDetected) => {
            println!(
                "{}",
                style("No AI coding assistants detected globally.").yellow()
            );
            println!("Install one of: Claude Code, Gemini CLI, or Codex CLI");
            println!("Or use: titools install --local");
            return Ok(ExitCode::from(1));
        }
        Err(err) => return Err(err.into()),
    };

    for candidate in &candidates {
        if candidate.config_dir.exists() {
            println!("{} {} detected", style("✓").green(), candidate.display_name);
        }
    }
    println!();

    let selection = if path.is_some() || all {
        PlatformSelection::All
    } else {
        let items: Vec<(String, bool)> = candidates
            .iter()
            .map(|p| {
                (
                    p.display_name.to_string(),
                    has_any_skill_link(&p.skills_link_dir),
                )
            })
            .collect();
        match select_many("Select platforms to sync", &items)? {
            Selection::Chosen(indices) => PlatformSelection::Named(
                indices
                    .into_iter()
                    .map(|index| candidates[index].name.to_string())
                    .collect(),
            ),
            Selection::Cancelled => return cancelled(),
        }
    };

    let remove_only = matches!(&selection, PlatformSelection::Named(names) if names.is_empty());
    if remove_only {
        println!(
            "{}",
            style("No platforms selected. Removing all platform symlinks and agents.").yellow()
        );
    } else {
        println!("Downloading from GitHub...");
    }

    let options = SyncSkillsOptions {
        scope: scope.clone(),
        selection,
        source: SkillSource::Remote,
    };
    let report = command.execute(&options).await?;
    render_sync_report(&report);

    println!();
    println!("{}", style("✓ Skills sync complete!").green());
    println!();
    if !report.remove_only {
        println!(
            "{} Add AGENTS.md to the project: {}",
            style("▸").bold(),
            style("titools sync").cyan()
        );
        println!();
        if scope.is_global() && platform::host_os() == HostOs::Windows {
            println!(
                "{} Windows: Ensure ~/bin is in your PATH",
                style("▸").yellow()
            );
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn render_sync_report(report: &SyncSkillsReport) {
    if report.remove_only {
        if report.skills.removed.is_empty() {
            println!("{} No skills to remove", style("ℹ").dim());
        } else {
            println!(
                "{} {} skills removed",
                style("✓").green(),
                report.skills.removed.len()
            );
        }
        if report.agents.removed.is_empty() {
            println!("{} No agents to remove", style("ℹ").dim());
        } else {
            println!("{} Platform agents removed", style("✓").green());
        }
    } else {
        println!(
            "{} {} skills installed",
            style("✓").green(),
            report.skills.installed.len()
        );
        if !report.agents.installed.is_empty() {
            println!("{} Platform agents installed", style("✓").green());
        } else if !report.agents.removed.is_empty() {
            println!("{} Platform agents removed", style("✓").green());
        } else {
            println!("{} No agents to install", style("ℹ").dim());
        }

        let total = catalog::skills(ArtifactFilter::CurrentOnly).len();
        for (display_name, links) in &report.links {
            if links.delivered() == total {
                println!("{} {display_name}: Skills linked", style("✓").green());
            } else {
                println!(
                    "{} {display_name}: {}/{total} skills linked",
                    style("!").yellow(),
                    links.delivered()
                );
            }
            if !links.copied.is_empty() {
                println!(
                    "{} {display_name}: {} copied instead of linked (re-run update to refresh)",
                    style("ℹ").dim(),
                    links.copied.len()
                );
            }
        }
    }

    for (display_name, unlinked) in &report.unlinked {
        if unlinked.removed.is_empty() {
            println!("{} {display_name}: No symlinks found", style("ℹ").dim());
        } else {
            println!("{} {display_name}: Skills unlinked", style("✓").green());
        }
    }

    let mut failed: Vec<&String> = report.skills.failed.iter().collect();
    failed.extend(report.agents.failed.iter());
    if !failed.is_empty() {
        println!(
            "{} Failed: {}",
            style("!").yellow(),
            failed
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

fn run_sync(path: &Path, force: bool, verbose: bool) -> Result<ExitCode> {
    println!();
    println!("{}", style("Titanium AI Knowledge Manager").blue().bold());
    println!();

    let home = home_dir()?;
    let cwd = std::env::current_dir()?;
    let project_dir = absolutize(&cwd, path);

    let command = KnowledgeSyncCommand::new(home);

    if !project::is_titanium_project(&project_dir) {
        println!(
            "{}",
            style("Error: Not a Titanium project (no tiapp.xml)").red()
        );
        println!("Run this command from the project root.");
        return Ok(ExitCode::from(1));
    }
    if !command.skills_installed(&project_dir) {
        println!("{}", style("Error: Skills not installed.").red());
        println!("{} {}", style("Run:").bold(), style("titools install").cyan());
        if verbose {
            println!(
                "{}",
                style(format!(
                    "Searched: ~/.agents/skills | {}/.agents/skills, .claude/skills, .gemini/skills",
                    project_dir.display()
                ))
                .dim()
            );
        }
        return Ok(ExitCode::from(1));
    }

    let sdk = project::detect_sdk_version(&project_dir).unwrap_or_else(|| "unknown".to_string());
    println!("{} Titanium project (SDK {sdk})", style("✓").green());
    println!();

    let selection = if force {
        KnowledgeSelection::Forced
    } else {
        let states = command.file_states(&project_dir);
        let items: Vec<(String, bool)> = states
            .iter()
            .map(|state| (state.name.clone(), state.has_block))
            .collect();
        match select_many("Select instruction files to sync", &items)? {
            Selection::Chosen(indices) => {
                if indices.is_empty() {
                    println!(
                        "{}",
                        style("No selection. Removing knowledge index from all files.").yellow()
                    );
                }
                KnowledgeSelection::Files(
                    indices
                        .into_iter()
                        .map(|index| states[index].name.clone())
                        .collect(),
                )
            }
            Selection::Cancelled => return cancelled(),
        }
    };

    let report = command.execute(&KnowledgeSyncOptions {
        project_dir,
        selection,
    })?;
    render_knowledge_report(&report);
    Ok(ExitCode::SUCCESS)
}

fn render_knowledge_report(report: &KnowledgeSyncReport) {
    for file in &report.failed {
        println!("{} Failed to sync {file}", style("!").yellow());
    }
    if report.changed() {
        let updated = if report.updated.is_empty() {
            String::new()
        } else {
            format!(" Updated: {}", report.updated.join(", "))
        };
        let cleaned = if report.removed.is_empty() {
            String::new()
        } else {
            format!(" Cleaned: {}", report.removed.join(", "))
        };
        println!();
        println!(
            "{}",
            style(format!("✓ sync complete!{updated}{cleaned}")).green()
        );
    } else {
        println!("{}", style("No changes made.").yellow());
    }
}

async fn run_update(local: bool) -> Result<ExitCode> {
    println!();
    println!("{}", style("Titanium SDK Skills Updater").blue().bold());
    println!();

    let home = home_dir()?;
    let cwd = std::env::current_dir()?;
    let is_project = project::is_titanium_project(&cwd);

    let scope = if local {
        Scope::Local(cwd.clone())
    } else if is_project && let Some(scope) = preferred_update_scope(&home, &cwd) {
        scope
    } else if is_project && !platform::detect_platforms(&Scope::Local(cwd.clone())).is_empty() {
        let items = vec![
            "Global skills (user home)".to_string(),
            "Local skills (current project)".to_string(),
        ];
        match select_one(
            "Local installation detected. What do you want to update",
            &items,
        )? {
            Selection::Chosen(1) => Scope::Local(cwd.clone()),
            Selection::Chosen(_) => Scope::Global(home.clone()),
            Selection::Cancelled => return cancelled(),
        }
    } else {
        Scope::Global(home.clone())
    };

    if scope.is_local() {
        println!("{}", style("Mode: Local update (current project)").cyan());
    } else {
        println!("{}", style("Mode: Global update (user home)").cyan());
    }
    println!();

    let command = UpdateCommand::new(home.clone());
    if !command.skills_installed(&scope) {
        println!("{}", style("No skills installed at this location.").yellow());
        println!("Install them first with:");
        println!("  titools install");
        return Ok(ExitCode::from(1));
    }

    println!("Checking for updates...");
    let report = match command.execute(&UpdateOptions { scope }).await {
        Ok(report) => report,
        Err(err) if err.downcast_ref::<PreconditionError>().is_some() => return Err(err),
        Err(err) => {
            println!("{} Update failed", style("✗").red());
            eprintln!("{err:#}");
            println!();
            println!("You can try manually installing from:");
            println!("{}", style(catalog::REPO_URL).cyan());
            return Ok(ExitCode::from(1));
        }
    };

    match &report.status {
        UpdateStatus::UpToDate => {
            println!(
                "{} Already up to date (v{})",
                style("ℹ").dim(),
                catalog::PACKAGE_VERSION
            );
            println!();
            println!(
                "{} Skills and agents are already at the latest version",
                style("✓").green()
            );
        }
        UpdateStatus::Updated {
            skills,
            agents,
            links,
        } => {
            println!("{} Skills: {}", style("✓").green(), skills.installed.join(", "));
            if agents.installed.is_empty() {
                println!("{} No agents to update", style("ℹ").dim());
            } else {
                println!("{} Agents: {}", style("✓").green(), agents.installed.join(", "));
            }
            let total = catalog::skills(ArtifactFilter::CurrentOnly).len();
            for (display_name, link_report) in links {
                if link_report.delivered() == total {
                    println!("{} {display_name} linked", style("✓").green());
                } else {
                    println!(
                        "{} {display_name}: {}/{total} linked",
                        style("!").yellow(),
                        link_report.delivered()
                    );
                }
            }
            println!();
            println!("{}", style("✓ Update complete!").green());
        }
    }
    println!();

    // Refresh the knowledge index in the surrounding project, if any.
    if is_project {
        let knowledge = KnowledgeSyncCommand::new(home);
        let has_any_file = knowledge
            .file_states(&cwd)
            .iter()
            .any(|state| state.exists);
        if has_any_file {
            let report = knowledge.execute(&KnowledgeSyncOptions {
                project_dir: cwd,
                selection: KnowledgeSelection::OnlyExisting,
            })?;
            render_knowledge_report(&report);
            println!();
            return Ok(ExitCode::SUCCESS);
        }
    }
    println!(
        "{} Run in the Titanium project: {}",
        style("▸").bold(),
        style("titools sync").cyan()
    );
    println!();

    Ok(ExitCode::SUCCESS)
}

fn run_remove(local: bool) -> Result<ExitCode> {
    println!();
    println!("{}", style("Titanium SDK Skills Uninstaller").blue().bold());
    println!();

    let home = home_dir()?;
    let cwd = std::env::current_dir()?;

    if local {
        println!(
            "{}",
            style("Mode: Local uninstallation (current project)").cyan()
        );
        println!();
    }

    let command = UninstallCommand::new(home);
    let inventory = command.inventory(&cwd);
    if inventory.is_empty() {
        println!(
            "{}",
            style("No skills, agents, symlinks, or knowledge index blocks found.").yellow()
        );
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    let mut choices: Vec<(String, UninstallTarget, bool)> = Vec::new();
    if inventory.agents {
        choices.push((
            "`ti-pro` agent for Claude Code".to_string(),
            UninstallTarget::Agents,
            true,
        ));
    }
    if inventory.knowledge_blocks {
        choices.push((
            "Knowledge index from context files".to_string(),
            UninstallTarget::Knowledge,
            true,
        ));
    }
    if inventory.home_skills {
        choices.push((
            "Skills from the home directory".to_string(),
            UninstallTarget::SkillsHome,
            false,
        ));
    }
    if inventory.project_skills {
        choices.push((
            "Skills from the project directory".to_string(),
            UninstallTarget::SkillsProject,
            false,
        ));
    }
    if inventory.home_links {
        choices.push((
            "Skill symlinks from the home directory".to_string(),
            UninstallTarget::LinksHome,
            false,
        ));
    }
    if inventory.project_links {
        choices.push((
            "Skill symlinks from the project directory".to_string(),
            UninstallTarget::LinksProject,
            false,
        ));
    }

    let items: Vec<(String, bool)> = choices
        .iter()
        .map(|(label, _, checked)| (label.clone(), *checked))
        .collect();
    let targets: Vec<UninstallTarget> = match select_many("What do you want to uninstall", &items)?
    {
        Selection::Chosen(indices) if indices.is_empty() => {
            println!("{}", style("Nothing to uninstall. Cancelled.").yellow());
            return Ok(ExitCode::SUCCESS);
        }
        Selection::Chosen(indices) => indices.into_iter().map(|index| choices[index].1).collect(),
        Selection::Cancelled => return cancelled(),
    };

    let report = command.execute(&UninstallOptions {
        project_dir: cwd,
        targets,
    });

    if !report.skills.removed.is_empty() {
        println!(
            "{} {} skills removed",
            style("✓").green(),
            report.skills.removed.len()
        );
    }
    if !report.agents.removed.is_empty() {
        println!("{} Platform agents removed", style("✓").green());
    }
    for (display_name, links) in &report.links {
        if links.removed.is_empty() {
            println!("{} {display_name}: No symlinks found", style("ℹ").dim());
        } else {
            println!("{} {display_name}: Skills unlinked", style("✓").green());
        }
    }
    if !report.knowledge_cleaned.is_empty() {
        println!(
            "{} Knowledge index removed from: {}",
            style("✓").green(),
            report.knowledge_cleaned.join(", ")
        );
    }

    println!();
    if report.changed() {
        println!("{}", style("✓ Uninstallation complete!").green());
    } else {
        println!("{}", style("No changes were necessary.").yellow());
    }
    println!();

    Ok(ExitCode::SUCCESS)
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn has_any_skill_link(dir: &Path) -> bool {
    catalog::skills(ArtifactFilter::All)
        .iter()
        .any(|skill| dir.join(skill).exists())
}

fn cancelled() -> Result<ExitCode> {
    println!("Cancelled.");
    Ok(ExitCode::SUCCESS)
}
