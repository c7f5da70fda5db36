//! Release staging and promotion.

mod common;

use common::{pid, Repo, PROD};
use hop_core::{BumpKind, PatchId, PatchStatus, Version};
use hop_engine::test_utils::{RecordingExecutor, SQL_BOOTSTRAP_MARKER};
use hop_engine::{
    EngineError, ErrorKind, NoopHook, PatchManager, ReleaseStager, ReleaseStatus, RunMode,
    ScriptRunner, Vcs,
};
use std::path::PathBuf;

/// Create and apply a patch with the given units, then return to production.
async fn applied_patch(repo: &Repo, id: &str, units: &[(&str, &str)]) -> PatchId {
    let manager = PatchManager::new(&repo.layout, &repo.config, &repo.vcs);
    let id = pid(id);
    manager.create(&id).unwrap();
    for (name, content) in units {
        repo.add_unit(&id, name, content);
    }
    let executor = RecordingExecutor::new();
    let runner = ScriptRunner::new(&executor, &NoopHook);
    manager.apply(&id, &runner, RunMode::Execute).await.unwrap();
    repo.vcs.checkout(PROD).unwrap();
    id
}

fn release_marker(repo: &Repo, version: &str) {
    std::fs::write(repo.layout.releases_dir().join(format!("{version}.txt")), "").unwrap();
}

#[test]
fn test_version_bumps_from_last_release() {
    let cases = [
        (None, BumpKind::Patch, "0.0.1"),
        (Some("0.1.4"), BumpKind::Minor, "0.2.0"),
        (Some("0.3.9"), BumpKind::Major, "1.0.0"),
    ];
    for (last, kind, expected) in cases {
        let repo = Repo::new();
        if let Some(last) = last {
            release_marker(&repo, "0.0.9");
            release_marker(&repo, last);
        }
        let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
        let version = stager.prepare(kind).unwrap();
        assert_eq!(version.to_string(), expected);
        assert!(repo.layout.stage_file(version).exists());

        let commit = repo.vcs.last_commit().unwrap();
        assert_eq!(commit.message, format!("[HOP] Prepare release {expected}"));
        assert_eq!(
            commit.paths,
            vec![PathBuf::from(format!("releases/{expected}-stage.txt"))]
        );
    }
}

#[test]
fn test_prepare_past_component_limit_is_rejected() {
    let repo = Repo::new();
    release_marker(&repo, &format!("0.0.{}", u32::MAX));
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);

    let err = stager.prepare(BumpKind::Patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(repo.layout.staging_versions().unwrap().is_empty());
    assert_eq!(
        stager.prepare(BumpKind::Minor).unwrap(),
        Version::new(0, 1, 0)
    );
}

#[test]
fn test_only_one_release_may_stage() {
    let repo = Repo::new();
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    stager.prepare(BumpKind::Minor).unwrap();

    let err = stager.prepare(BumpKind::Patch).unwrap_err();
    assert!(matches!(
        err,
        EngineError::AlreadyStaging { version } if version == Version::new(0, 1, 0)
    ));
    assert_eq!(err.kind(), ErrorKind::State);
    assert_eq!(repo.layout.staging_versions().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stage_is_append_only_and_ordered() {
    let repo = Repo::new();
    let first = applied_patch(&repo, "1-first-patch", &[("1_a.sql", "SELECT 1;")]).await;
    let second = applied_patch(&repo, "2-second-patch", &[("1_a.sql", "SELECT 1;")]).await;
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    let version = stager.prepare(BumpKind::Patch).unwrap();

    stager.add_to_release(&first).unwrap();
    let release = stager.add_to_release(&second).unwrap();
    assert_eq!(release.stage_entries, vec![first.clone(), second.clone()]);
    assert_eq!(release.status, ReleaseStatus::Staging);
    assert_eq!(
        repo.stage_lines(version),
        vec!["1-first-patch", "2-second-patch"]
    );

    let err = stager.add_to_release(&first).unwrap_err();
    assert!(matches!(err, EngineError::DuplicatePatchInStage { .. }));
    assert_eq!(err.kind(), ErrorKind::Duplicate);
    assert_eq!(
        repo.stage_lines(version),
        vec!["1-first-patch", "2-second-patch"]
    );
}

#[tokio::test]
async fn test_add_to_release_commits_only_the_stage_file() {
    let repo = Repo::new();
    let id = applied_patch(&repo, "1-first-patch", &[("1_a.sql", "SELECT 1;")]).await;
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    stager.prepare(BumpKind::Patch).unwrap();

    stager.add_to_release(&id).unwrap();
    let commit = repo.vcs.last_commit().unwrap();
    assert_eq!(commit.branch, PROD);
    assert_eq!(commit.message, "[HOP] Add 1-first-patch to release 0.0.1");
    assert_eq!(commit.paths, vec![PathBuf::from("releases/0.0.1-stage.txt")]);
    assert!(commit
        .paths
        .iter()
        .all(|p| !p.starts_with("Patches")));

    let manager = PatchManager::new(&repo.layout, &repo.config, &repo.vcs);
    let patch = manager.status(&id).unwrap();
    assert_eq!(patch.status, PatchStatus::Staged);
    assert_eq!(patch.release, Some(Version::new(0, 0, 1)));
}

#[tokio::test]
async fn test_add_to_release_on_patch_branch_writes_nothing() {
    let repo = Repo::new();
    let id = applied_patch(&repo, "1-first-patch", &[("1_a.sql", "SELECT 1;")]).await;
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    let version = stager.prepare(BumpKind::Patch).unwrap();
    let commits_before = repo.vcs.commits().len();

    repo.vcs.checkout(&id.branch_name()).unwrap();
    let err = stager.add_to_release(&id).unwrap_err();
    assert!(matches!(err, EngineError::WrongBranch { .. }));
    assert!(repo.stage_lines(version).is_empty());
    assert_eq!(repo.vcs.commits().len(), commits_before);
}

#[tokio::test]
async fn test_add_to_release_needs_open_release_and_applied_patch() {
    let repo = Repo::new();
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    let id = applied_patch(&repo, "1-first-patch", &[("1_a.sql", "SELECT 1;")]).await;
    assert!(matches!(
        stager.add_to_release(&id),
        Err(EngineError::NoOpenRelease)
    ));

    let manager = PatchManager::new(&repo.layout, &repo.config, &repo.vcs);
    let fresh = pid("2-not-applied");
    manager.create(&fresh).unwrap();
    repo.vcs.checkout(PROD).unwrap();
    stager.prepare(BumpKind::Patch).unwrap();
    assert!(matches!(
        stager.add_to_release(&fresh),
        Err(EngineError::PatchState { .. })
    ));
    assert!(matches!(
        stager.add_to_release(&pid("3-unknown")),
        Err(EngineError::Core(hop_core::CoreError::PatchNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_promote_archives_release_and_copies_bootstrap_units() {
    let repo = Repo::new();
    let bootstrap = format!("{SQL_BOOTSTRAP_MARKER}INSERT INTO ref VALUES (1);\n");
    std::fs::write(
        repo.layout.bootstrap_dir().join("4-older-0.0.1.sql"),
        &bootstrap,
    )
    .unwrap();

    let first = applied_patch(
        &repo,
        "1-first-patch",
        &[("1_schema.sql", "CREATE TABLE ref (id INT);"), ("2_data.sql", bootstrap.as_str())],
    )
    .await;
    let second =
        applied_patch(&repo, "2-second-patch", &[("1_seed.sql", bootstrap.as_str())]).await;

    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    let version = stager.prepare(BumpKind::Minor).unwrap();
    stager.add_to_release(&first).unwrap();
    stager.add_to_release(&second).unwrap();

    let release = stager.promote("Reference data").unwrap();
    assert_eq!(release.status, ReleaseStatus::Committed);
    assert_eq!(release.stage_entries, vec![first.clone(), second.clone()]);

    assert!(!repo.layout.stage_file(version).exists());
    assert_eq!(
        std::fs::read_to_string(repo.layout.release_file(version)).unwrap(),
        "1-first-patch\n2-second-patch\n"
    );
    let manifest = stager.last_manifest().unwrap().unwrap();
    assert_eq!(manifest.new_release_identifier, version);
    assert_eq!(manifest.changelog_message, "Reference data");
    assert_eq!(manifest.tool_version, repo.config.tool_version);

    let bootstrap_dir = repo.layout.bootstrap_dir();
    assert!(bootstrap_dir.join("5-1-first-patch-0.1.0.sql").exists());
    assert!(bootstrap_dir.join("6-2-second-patch-0.1.0.sql").exists());
    assert!(!bootstrap_dir.join("7-1-first-patch-0.1.0.sql").exists());

    let commits = repo.vcs.commits();
    let merges: Vec<&str> = commits
        .iter()
        .filter_map(|c| c.merged.as_deref())
        .collect();
    assert_eq!(merges, vec!["ho-patch/1-first-patch", "ho-patch/2-second-patch"]);

    let release_commit = commits.last().unwrap();
    assert_eq!(release_commit.message, "[HOP] Release 0.1.0");
    for path in [
        "releases/0.1.0.txt",
        "releases/0.1.0-stage.txt",
        "releases/0.1.0.json",
        "bootstrap/5-1-first-patch-0.1.0.sql",
        "bootstrap/6-2-second-patch-0.1.0.sql",
    ] {
        assert!(
            release_commit.paths.contains(&PathBuf::from(path)),
            "missing {path}"
        );
    }
    assert_eq!(release_commit.paths.len(), 5);

    let manager = PatchManager::new(&repo.layout, &repo.config, &repo.vcs);
    assert_eq!(manager.status(&first).unwrap().status, PatchStatus::Released);
    assert_eq!(stager.last_released().unwrap(), version);
    assert!(stager.current_release().unwrap().is_none());

    // Released ids stay reserved.
    assert!(matches!(
        manager.create(&first),
        Err(EngineError::DuplicatePatch { .. })
    ));
}

#[tokio::test]
async fn test_promote_rejects_empty_release() {
    let repo = Repo::new();
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    assert!(stager.last_manifest().unwrap().is_none());
    assert!(matches!(stager.promote("x"), Err(EngineError::NoOpenRelease)));

    stager.prepare(BumpKind::Patch).unwrap();
    assert!(matches!(
        stager.promote("x"),
        Err(EngineError::EmptyRelease { .. })
    ));
}

#[tokio::test]
async fn test_rejected_release_commit_leaves_release_resumable() {
    let repo = Repo::new();
    let bootstrap = format!("{SQL_BOOTSTRAP_MARKER}INSERT INTO ref VALUES (1);\n");
    let id = applied_patch(&repo, "1-first-patch", &[("1_seed.sql", bootstrap.as_str())]).await;
    let stager = ReleaseStager::new(&repo.layout, &repo.config, &repo.vcs);
    let version = stager.prepare(BumpKind::Patch).unwrap();
    stager.add_to_release(&id).unwrap();

    repo.vcs.reject_commits(Some("pre-commit hook failed"));
    let err = stager.promote("First").unwrap_err();
    assert!(matches!(err, EngineError::Vcs { .. }));

    assert!(repo.layout.stage_file(version).exists());
    assert!(!repo.layout.release_file(version).exists());
    assert!(!repo.layout.manifest_file(version).exists());
    assert!(!repo
        .layout
        .bootstrap_dir()
        .join("1-1-first-patch-0.0.1.sql")
        .exists());
    assert_eq!(stager.last_released().unwrap(), Version::default());
    let open = stager.current_release().unwrap().unwrap();
    assert_eq!(open.stage_entries, vec![id.clone()]);
    let manager = PatchManager::new(&repo.layout, &repo.config, &repo.vcs);
    assert_eq!(manager.status(&id).unwrap().status, PatchStatus::Staged);

    repo.vcs.reject_commits(None);
    let release = stager.promote("First").unwrap();
    assert_eq!(release.version, version);
    assert!(repo
        .layout
        .bootstrap_dir()
        .join("1-1-first-patch-0.0.1.sql")
        .exists());
    assert_eq!(manager.status(&id).unwrap().status, PatchStatus::Released);
}
