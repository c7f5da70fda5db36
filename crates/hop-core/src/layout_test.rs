use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_paths() {
    let layout = RepoLayout::new("/repo");
    let id = PatchId::parse("1-first-patch").unwrap();
    let v = Version::new(0, 1, 0);

    assert_eq!(layout.config_path(), PathBuf::from("/repo/.hop/config.yml"));
    assert_eq!(layout.patch_dir(&id), PathBuf::from("/repo/Patches/1-first-patch"));
    assert_eq!(layout.stage_file(v), PathBuf::from("/repo/releases/0.1.0-stage.txt"));
    assert_eq!(layout.release_file(v), PathBuf::from("/repo/releases/0.1.0.txt"));
    assert_eq!(layout.manifest_file(v), PathBuf::from("/repo/releases/0.1.0.json"));
    assert_eq!(
        layout.relative(&layout.stage_file(v)),
        PathBuf::from("releases/0.1.0-stage.txt")
    );
}

#[test]
fn test_released_and_staging_versions() {
    let dir = tempdir().unwrap();
    let layout = RepoLayout::new(dir.path());
    assert!(layout.released_versions().unwrap().is_empty());

    fs::create_dir_all(layout.releases_dir()).unwrap();
    fs::write(layout.release_file(Version::new(0, 10, 0)), "a\n").unwrap();
    fs::write(layout.release_file(Version::new(0, 9, 1)), "b\n").unwrap();
    fs::write(layout.manifest_file(Version::new(0, 10, 0)), "{}").unwrap();
    fs::write(layout.stage_file(Version::new(0, 11, 0)), "").unwrap();
    fs::write(layout.releases_dir().join("notes.txt"), "").unwrap();

    assert_eq!(
        layout.released_versions().unwrap(),
        vec![Version::new(0, 9, 1), Version::new(0, 10, 0)]
    );
    assert_eq!(
        layout.staging_versions().unwrap(),
        vec![Version::new(0, 11, 0)]
    );
}
