use super::*;
use std::fs;
use tempfile::tempdir;

fn patch() -> PatchId {
    PatchId::parse("1-first-patch").unwrap()
}

#[test]
fn test_parse_patch_script_name() {
    assert_eq!(
        parse_patch_script_name("1_create_users.sql"),
        Some((1, ScriptKind::Sql))
    );
    assert_eq!(
        parse_patch_script_name("010_fill.py"),
        Some((10, ScriptKind::Procedural))
    );
    assert_eq!(parse_patch_script_name("README.md"), None);
    assert_eq!(parse_patch_script_name("create.sql"), None);
    assert_eq!(parse_patch_script_name("1_x.rb"), None);
}

#[test]
fn test_discover_units_orders_numerically() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("10_last.sql"), "SELECT 10;").unwrap();
    fs::write(dir.path().join("2_second.py"), "print(2)").unwrap();
    fs::write(dir.path().join("1_first.sql"), "SELECT 1;").unwrap();
    fs::write(dir.path().join("README.md"), "# patch").unwrap();

    let units = discover_units(dir.path(), &patch()).unwrap();
    let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["1_first.sql", "2_second.py", "10_last.sql"]);
    assert_eq!(units[1].kind, ScriptKind::Procedural);
    assert!(units.iter().all(|u| u.patch_id == patch()));
}

#[test]
fn test_discover_units_rejects_duplicate_sequence() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("1_a.sql"), "SELECT 1;").unwrap();
    fs::write(dir.path().join("01_b.sql"), "SELECT 1;").unwrap();

    let err = discover_units(dir.path(), &patch()).unwrap_err();
    match err {
        CoreError::DuplicateSequence {
            sequence,
            first,
            second,
            ..
        } => {
            assert_eq!(sequence, 1);
            assert_eq!(first, "01_b.sql");
            assert_eq!(second, "1_a.sql");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_discover_units_rejects_unprefixed_script() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("create_users.sql"), "SELECT 1;").unwrap();

    let err = discover_units(dir.path(), &patch()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidScriptName { .. }));
}

#[test]
fn test_discover_units_reads_tag() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("1_schema.sql"), "CREATE TABLE t (id INT);").unwrap();
    fs::write(
        dir.path().join("2_data.sql"),
        "-- @HOP:bootstrap\nINSERT INTO t VALUES (1);",
    )
    .unwrap();

    let units = discover_units(dir.path(), &patch()).unwrap();
    assert_eq!(units[0].tag, UnitTag::Plain);
    assert_eq!(units[1].tag, UnitTag::Bootstrap);
}

#[test]
fn test_discover_units_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let units = discover_units(&dir.path().join("missing"), &patch()).unwrap();
    assert!(units.is_empty());
}

#[test]
fn test_parse_bootstrap_name() {
    let (number, unit_id, version, kind) =
        parse_bootstrap_name("3-1-first-patch-0.1.0.sql").unwrap();
    assert_eq!(number, 3);
    assert_eq!(unit_id, "1-first-patch");
    assert_eq!(version, Version::new(0, 1, 0));
    assert_eq!(kind, ScriptKind::Sql);
    assert!(parse_bootstrap_name("3_seed.sql").is_none());
    assert!(parse_bootstrap_name("3-seed.sql").is_none());
}

#[test]
fn test_bootstrap_file_name_format() {
    assert_eq!(
        bootstrap_file_name(4, "2-roles", Version::new(1, 2, 3), ScriptKind::Procedural),
        "4-2-roles-1.2.3.py"
    );
}

#[test]
fn test_discover_bootstrap_filters_and_orders() {
    let dir = tempdir().unwrap();
    let tagged = "-- @HOP:bootstrap\nSELECT 1;\n";
    fs::write(dir.path().join("2-b-0.1.0.sql"), tagged).unwrap();
    fs::write(dir.path().join("10-c-0.2.0.sql"), tagged).unwrap();
    fs::write(dir.path().join("1-a-0.1.0.sql"), tagged).unwrap();
    fs::write(dir.path().join("3-untagged-0.1.0.sql"), "SELECT 3;\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::write(dir.path().join(".gitkeep"), "").unwrap();

    let files = discover_bootstrap(dir.path()).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["1-a-0.1.0.sql", "2-b-0.1.0.sql", "10-c-0.2.0.sql"]);
    assert_eq!(highest_bootstrap_number(dir.path()).unwrap(), 10);
}

#[test]
fn test_discover_bootstrap_rejects_duplicate_numbers() {
    let dir = tempdir().unwrap();
    let tagged = "-- @HOP:bootstrap\nSELECT 1;\n";
    fs::write(dir.path().join("1-a-0.1.0.sql"), tagged).unwrap();
    fs::write(dir.path().join("1-b-0.1.0.sql"), tagged).unwrap();

    assert!(matches!(
        discover_bootstrap(dir.path()),
        Err(CoreError::DuplicateSequence { sequence: 1, .. })
    ));
}
