use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use titools_core::catalog::{LEGACY_AGENTS, LEGACY_SKILLS, SKILLS};
use titools_core::paths;
use titools_core::reconcile::Reconciler;
use titools_core::types::Scope;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

fn seed_legacy(scope: &Scope) {
    let legacy_skill = LEGACY_SKILLS[0];
    let legacy_agent = LEGACY_AGENTS[0];
    fs::create_dir_all(paths::skills_dir(scope).join(legacy_skill)).expect("legacy skill");
    write_file(
        &paths::agents_dir(scope).join(format!("{legacy_agent}.md")),
        "# old agent\n",
    );
    // A detected platform carrying a legacy link.
    fs::create_dir_all(paths::platform_skills_dir(scope, "claude").join(legacy_skill))
        .expect("legacy platform link");
}

fn assert_clean(scope: &Scope) {
    let legacy_skill = LEGACY_SKILLS[0];
    let legacy_agent = LEGACY_AGENTS[0];
    assert!(!paths::skills_dir(scope).join(legacy_skill).exists());
    assert!(
        !paths::agents_dir(scope)
            .join(format!("{legacy_agent}.md"))
            .exists()
    );
    assert!(
        !paths::platform_skills_dir(scope, "claude")
            .join(legacy_skill)
            .exists()
    );
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
fn local_cleanup_purges_both_scopes() {
    let (_tmp, home, project) = sandbox();
    let global = Scope::Global(home.clone());
    let local = Scope::Local(project);

    seed_legacy(&global);
    seed_legacy(&local);

    let reconciler = Reconciler::new(home);
    let result = reconciler.cleanup_legacy_artifacts(&local);

    assert_clean(&local);
    assert_clean(&global);
    assert!(result.failed.is_empty());
    assert!(result.installed.is_empty(), "cleanup never installs");
}

#[test]
fn global_cleanup_stays_out_of_projects() {
    let (_tmp, home, project) = sandbox();
    let global = Scope::Global(home.clone());
    let local = Scope::Local(project);

    seed_legacy(&global);
    seed_legacy(&local);

    let reconciler = Reconciler::new(home);
    reconciler.cleanup_legacy_artifacts(&global);

    assert_clean(&global);
    // The project was not part of this invocation.
    assert!(
        paths::skills_dir(&local)
            .join(LEGACY_SKILLS[0])
            .exists()
    );
}

#[test]
fn cleanup_leaves_current_artifacts_alone() {
    let (_tmp, home, _project) = sandbox();
    let global = Scope::Global(home.clone());

    seed_legacy(&global);
    fs::create_dir_all(paths::skills_dir(&global).join(SKILLS[0])).expect("current skill");
    fs::create_dir_all(paths::platform_skills_dir(&global, "claude").join(SKILLS[0]))
        .expect("current link");

    let reconciler = Reconciler::new(home);
    reconciler.cleanup_legacy_artifacts(&global);

    assert_clean(&global);
    assert!(paths::skills_dir(&global).join(SKILLS[0]).exists());
    assert!(
        paths::platform_skills_dir(&global, "claude")
            .join(SKILLS[0])
            .exists()
    );
}

#[test]
fn cleanup_is_idempotent() {
    let (_tmp, home, project) = sandbox();
    let local = Scope::Local(project);
    seed_legacy(&local);

    let reconciler = Reconciler::new(home);
    let first = reconciler.cleanup_legacy_artifacts(&local);
    assert!(!first.removed.is_empty());
    let second = reconciler.cleanup_legacy_artifacts(&local);
    assert!(second.removed.is_empty());
    assert!(second.failed.is_empty());
}
