#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use titools_core::catalog::{AGENTS, SKILLS};
use titools_core::commands::{
    PlatformSelection, PreconditionError, SkillSource, SyncSkillsCommand, SyncSkillsOptions,
};
use titools_core::paths;
use titools_core::types::Scope;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

fn make_source_tree(tmp: &TempDir) -> PathBuf {
    let root = tmp.path().join("source");
    for skill in SKILLS {
        write_file(
            &root.join("skills").join(skill).join("SKILL.md"),
            &format!("# {skill}\n"),
        );
    }
    for agent in AGENTS {
        write_file(
            &root.join("agents").join(format!("{agent}.md")),
            &format!("# {agent}\n"),
        );
    }
    root
}

fn sandbox() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().expect("tempdir should succeed");
    let home = tmp.path().join("home");
    let project = tmp.path().join("project");
    fs::create_dir_all(&home).expect("create home");
    fs::create_dir_all(&project).expect("create project");
    (tmp, home, project)
}

#[tokio::test]
async fn local_sync_installs_and_links_selected_platforms() {
    let (tmp, home, project) = sandbox();
    let source = make_source_tree(&tmp);
    fs::create_dir_all(project.join(".claude")).expect("create .claude");
    fs::create_dir_all(project.join(".gemini")).expect("create .gemini");

    let scope = Scope::Local(project.clone());
    let command = SyncSkillsCommand::new(home.clone());
    let report = command
        .execute(&SyncSkillsOptions {
            scope: scope.clone(),
            selection: PlatformSelection::All,
            source: SkillSource::LocalTree(source),
        })
        .await
        .expect("sync should succeed");

    assert!(!report.remove_only);
    assert_eq!(report.skills.installed.len(), SKILLS.len());
    assert!(report.skills.failed.is_empty());
    assert_eq!(report.agents.installed.len(), AGENTS.len());

    for skill in SKILLS {
        assert!(paths::skills_dir(&scope).join(skill).exists());
        let claude_link = project.join(".claude").join("skills").join(skill);
        let meta = fs::symlink_metadata(&claude_link).expect("link should exist");
        assert!(meta.file_type().is_symlink());
        assert!(claude_link.join("SKILL.md").is_file());
        assert!(project.join(".gemini").join("skills").join(skill).exists());
    }

    // The home directory stayed untouched.
    assert!(!home.join(".agents").exists());
    assert!(!home.join(".claude").exists());
}

#[tokio::test]
async fn deselecting_claude_removes_agents_and_unlinks_it() {
    let (tmp, home, project) = sandbox();
    let source = make_source_tree(&tmp);
    fs::create_dir_all(project.join(".claude")).expect("create .claude");
    fs::create_dir_all(project.join(".gemini")).expect("create .gemini");

    let scope = Scope::Local(project.clone());
    let command = SyncSkillsCommand::new(home.clone());

    // First pass links both platforms and installs the agent.
    command
        .execute(&SyncSkillsOptions {
            scope: scope.clone(),
            selection: PlatformSelection::All,
            source: SkillSource::LocalTree(source.clone()),
        })
        .await
        .expect("first sync should succeed");
    assert!(
        paths::agents_dir(&scope)
            .join(format!("{}.md", AGENTS[0]))
            .exists()
    );

    // Second pass keeps only gemini.
    let report = command
        .execute(&SyncSkillsOptions {
            scope: scope.clone(),
            selection: PlatformSelection::Named(vec!["gemini".to_string()]),
            source: SkillSource::LocalTree(source),
        })
        .await
        .expect("second sync should succeed");

    assert!(
        !paths::agents_dir(&scope)
            .join(format!("{}.md", AGENTS[0]))
            .exists()
    );
    assert!(report.unlinked.iter().any(|(name, result)| {
        name == "Claude Code" && !result.removed.is_empty()
    }));
    for skill in SKILLS {
        assert!(!project.join(".claude").join("skills").join(skill).exists());
        assert!(project.join(".gemini").join("skills").join(skill).exists());
    }
}

#[tokio::test]
async fn empty_selection_degrades_to_remove_only() {
    let (tmp, home, project) = sandbox();
    let source = make_source_tree(&tmp);
    fs::create_dir_all(project.join(".codex")).expect("create .codex");

    let scope = Scope::Local(project.clone());
    let command = SyncSkillsCommand::new(home.clone());
    command
        .execute(&SyncSkillsOptions {
            scope: scope.clone(),
            selection: PlatformSelection::All,
            source: SkillSource::LocalTree(source),
        })
        .await
        .expect("install should succeed");

    let report = command
        .execute(&SyncSkillsOptions {
            scope: scope.clone(),
            selection: PlatformSelection::Named(Vec::new()),
            source: SkillSource::Remote,
        })
        .await
        .expect("remove-only sync should succeed (and must not hit the network)");

    assert!(report.remove_only);
    assert!(!report.skills.removed.is_empty());
    for skill in SKILLS {
        assert!(!paths::skills_dir(&scope).join(skill).exists());
        assert!(!project.join(".codex").join("skills").join(skill).exists());
    }
}

#[tokio::test]
async fn global_scope_without_platforms_is_a_precondition_failure() {
    let (_tmp, home, _project) = sandbox();
    let command = SyncSkillsCommand::new(home.clone());
    let err = command
        .execute(&SyncSkillsOptions {
            scope: Scope::Global(home),
            selection: PlatformSelection::All,
            source: SkillSource::Remote,
        })
        .await
        .expect_err("global sync without platforms should fail");
    assert!(matches!(
        err.downcast_ref::<PreconditionError>(),
        Some(PreconditionError::NoPlatformsDetected)
    ));
}

#[test]
fn local_candidates_merge_globally_detected_platforms() {
    let (_tmp, home, project) = sandbox();
    fs::create_dir_all(home.join(".codex")).expect("create global .codex");
    fs::create_dir_all(project.join(".claude")).expect("create local .claude");

    let command = SyncSkillsCommand::new(home);
    let scope = Scope::Local(project.clone());
    let candidates = command
        .candidate_platforms(&scope)
        .expect("local candidates should resolve");

    let names: Vec<&str> = candidates.iter().map(|p| p.name).collect();
    assert!(names.contains(&"claude"));
    assert!(names.contains(&"codex"));
    // Merged candidates always carry scope-local directories.
    for candidate in &candidates {
        assert!(candidate.skills_link_dir.starts_with(&project));
    }
}
