use super::*;
use crate::vcs::MemoryVcs;

#[test]
fn test_init_writes_layout_and_commits() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RepoLayout::new(dir.path());
    let vcs = MemoryVcs::new("main");

    let config = init(&layout, "billing", "ho-prod", &vcs).unwrap();
    assert_eq!(config.tool_version, latest_version());
    assert_eq!(config.production_branch, "ho-prod");
    assert_eq!(HopConfig::load(&layout.config_path()).unwrap(), config);
    assert!(layout.patches_dir().is_dir());
    assert!(layout.releases_dir().is_dir());
    assert!(layout.bootstrap_dir().is_dir());

    assert_eq!(vcs.current_branch().unwrap(), "ho-prod");
    let commit = vcs.last_commit().unwrap();
    assert_eq!(commit.branch, "ho-prod");
    assert_eq!(commit.message, "[HOP] Initialize billing");
    assert!(commit.paths.contains(&PathBuf::from(".hop/config.yml")));
    assert!(commit.paths.contains(&PathBuf::from(".gitignore")));
}

#[test]
fn test_init_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RepoLayout::new(dir.path());
    let vcs = MemoryVcs::new("ho-prod");

    init(&layout, "billing", "ho-prod", &vcs).unwrap();
    let err = init(&layout, "billing", "ho-prod", &vcs).unwrap_err();
    assert!(matches!(err, EngineError::AlreadyInitialized { .. }));
    assert_eq!(vcs.commits().len(), 1);
}

#[test]
fn test_init_rejects_patch_branch_as_production() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RepoLayout::new(dir.path());
    let vcs = MemoryVcs::new("main");

    assert!(init(&layout, "billing", "ho-patch/x", &vcs).is_err());
    assert_eq!(vcs.current_branch().unwrap(), "main");
    assert!(vcs.commits().is_empty());
}
