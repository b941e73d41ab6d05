use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use titools_core::catalog::{AGENTS, SKILLS};
use titools_core::commands::{
    KnowledgeSelection, KnowledgeSyncCommand, KnowledgeSyncOptions, UninstallCommand,
    UninstallOptions, UninstallTarget,
};
use titools_core::knowledge::block_exists;
use titools_core::paths;
use titools_core::types::Scope;

const TIAPP: &str = "<ti:app><id>com.test</id><sdk-version>13.1.1.GA</sdk-version></ti:app>\n";

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

fn sandbox() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let home = tmp.path().join("home");
    let project = tmp.path().join("project");
    fs::create_dir_all(&home).expect("create home");
    fs::create_dir_all(&project).expect("create project");
    (tmp, home, project)
}

#[test]
fn inventory_is_empty_on_a_pristine_machine() {
    let (_tmp, home, project) = sandbox();
    let command = UninstallCommand::new(home);
    assert!(command.inventory(&project).is_empty());
}

#[test]
fn inventory_reflects_what_exists() {
    let (_tmp, home, project) = sandbox();
    write_file(&project.join("tiapp.xml"), TIAPP);

    let global = Scope::Global(home.clone());
    fs::create_dir_all(paths::skills_dir(&global).join(SKILLS[0])).expect("global skill");
    write_file(
        &paths::agents_dir(&global).join(format!("{}.md", AGENTS[0])),
        "# agent\n",
    );
    let local = Scope::Local(project.clone());
    fs::create_dir_all(paths::skills_dir(&local).join(SKILLS[1])).expect("local skill");

    let command = UninstallCommand::new(home);
    let inventory = command.inventory(&project);
    assert!(inventory.home_skills);
    assert!(inventory.project_skills);
    assert!(inventory.agents);
    assert!(!inventory.home_links);
    assert!(!inventory.knowledge_blocks);
}

#[test]
fn selected_targets_are_removed_others_kept() {
    let (_tmp, home, project) = sandbox();
    write_file(&project.join("tiapp.xml"), TIAPP);

    let global = Scope::Global(home.clone());
    let local = Scope::Local(project.clone());
    fs::create_dir_all(paths::skills_dir(&global).join(SKILLS[0])).expect("global skill");
    fs::create_dir_all(paths::skills_dir(&local).join(SKILLS[0])).expect("local skill");
    write_file(
        &paths::agents_dir(&global).join(format!("{}.md", AGENTS[0])),
        "# agent\n",
    );

    let command = UninstallCommand::new(home);
    let report = command.execute(&UninstallOptions {
        project_dir: project.clone(),
        targets: vec![UninstallTarget::SkillsHome, UninstallTarget::Agents],
    });

    assert!(report.changed());
    assert!(!paths::skills_dir(&global).join(SKILLS[0]).exists());
    assert!(
        !paths::agents_dir(&global)
            .join(format!("{}.md", AGENTS[0]))
            .exists()
    );
    // Project skills were not selected and survive.
    assert!(paths::skills_dir(&local).join(SKILLS[0]).exists());
}

#[test]
fn knowledge_target_cleans_every_block_carrying_file() {
    let (_tmp, home, project) = sandbox();
    write_file(&project.join("tiapp.xml"), TIAPP);
    for skill in SKILLS {
        fs::create_dir_all(project.join(".agents").join("skills").join(skill))
            .expect("local skill");
    }

    let knowledge = KnowledgeSyncCommand::new(home.clone());
    knowledge
        .execute(&KnowledgeSyncOptions {
            project_dir: project.clone(),
            selection: KnowledgeSelection::Files(vec![
                "AGENTS.md".to_string(),
                "CLAUDE.md".to_string(),
            ]),
        })
        .expect("seeding sync should succeed");

    let command = UninstallCommand::new(home);
    assert!(command.inventory(&project).knowledge_blocks);

    let report = command.execute(&UninstallOptions {
        project_dir: project.clone(),
        targets: vec![UninstallTarget::Knowledge],
    });

    assert_eq!(report.knowledge_cleaned, vec!["AGENTS.md", "CLAUDE.md"]);
    assert!(!block_exists(&project.join("AGENTS.md")));
    assert!(!block_exists(&project.join("CLAUDE.md")));
    // The files themselves are the user's; only the block goes.
    assert!(project.join("AGENTS.md").exists());
}

#[test]
fn uninstalling_nothing_reports_no_change() {
    let (_tmp, home, project) = sandbox();
    let command = UninstallCommand::new(home);
    let report = command.execute(&UninstallOptions {
        project_dir: project,
        targets: vec![UninstallTarget::SkillsHome, UninstallTarget::LinksHome],
    });
    assert!(!report.changed());
}
