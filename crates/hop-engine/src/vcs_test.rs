use super::*;

#[test]
fn test_memory_vcs_branches() {
    let vcs = MemoryVcs::new("ho-prod");
    assert_eq!(vcs.current_branch().unwrap(), "ho-prod");
    assert!(!vcs.branch_exists("ho-patch/1-a").unwrap());

    vcs.create_branch("ho-patch/1-a").unwrap();
    assert_eq!(vcs.current_branch().unwrap(), "ho-patch/1-a");
    assert!(vcs.create_branch("ho-patch/1-a").is_err());

    vcs.checkout("ho-prod").unwrap();
    assert_eq!(vcs.current_branch().unwrap(), "ho-prod");
    assert!(vcs.checkout("missing").is_err());
}

#[test]
fn test_memory_vcs_clones_share_state() {
    let vcs = MemoryVcs::new("ho-prod");
    let handle = vcs.clone();
    vcs.commit(&[PathBuf::from("releases/0.1.0-stage.txt")], "[HOP] Prepare release 0.1.0")
        .unwrap();

    let commit = handle.last_commit().unwrap();
    assert_eq!(commit.branch, "ho-prod");
    assert_eq!(commit.paths, vec![PathBuf::from("releases/0.1.0-stage.txt")]);
    assert!(commit.merged.is_none());
}

#[test]
fn test_memory_vcs_merge_requires_branch() {
    let vcs = MemoryVcs::new("ho-prod");
    assert!(vcs.merge("ho-patch/nope", "merge").is_err());

    vcs.create_branch("ho-patch/1-a").unwrap();
    vcs.checkout("ho-prod").unwrap();
    vcs.merge("ho-patch/1-a", "merge").unwrap();
    assert_eq!(
        vcs.last_commit().unwrap().merged.as_deref(),
        Some("ho-patch/1-a")
    );
}

#[test]
fn test_git_cli_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!is_git_repository(dir.path()));
    let git = GitCli::new(dir.path());
    assert!(matches!(
        git.current_branch(),
        Err(EngineError::Vcs { .. })
    ));
}
