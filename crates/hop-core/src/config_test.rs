use super::*;
use tempfile::tempdir;

#[test]
fn test_parse_minimal_config() {
    let config: HopConfig = serde_yaml::from_str("package_name: app\n").unwrap();
    assert_eq!(config.package_name, "app");
    assert_eq!(config.tool_version, Version::new(0, 0, 0));
    assert_eq!(config.production_branch, "ho-prod");
    assert!(config.database.path.is_none());
    assert_eq!(config.database_path(), "app.duckdb");
    assert_eq!(config.procedural_interpreter, "python3");
    assert!(config.codegen_command.is_none());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
package_name: billing
tool_version: "0.17.4"
production_branch: main
database:
  path: "./billing.duckdb"
procedural_interpreter: python3.12
codegen_command: ["make", "models"]
"#;
    let config: HopConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.tool_version, Version::new(0, 17, 4));
    assert_eq!(config.production_branch, "main");
    assert_eq!(config.database_path(), "./billing.duckdb");
    assert_eq!(
        config.codegen_command,
        Some(vec!["make".to_string(), "models".to_string()])
    );
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<HopConfig, _> = serde_yaml::from_str("package_name: a\ndevel: true\n");
    assert!(result.is_err());
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = HopConfig::load(&dir.path().join("config.yml")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(&path, "package_name: app\nproduction_branch: ho-patch/x\n").unwrap();
    assert!(matches!(
        HopConfig::load(&path),
        Err(CoreError::ConfigInvalid { .. })
    ));

    std::fs::write(&path, "package_name: \"\"\n").unwrap();
    assert!(HopConfig::load(&path).is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".hop").join("config.yml");
    let config = HopConfig::new("app", Version::new(0, 17, 5));

    config.save(&path).unwrap();
    assert_eq!(HopConfig::load(&path).unwrap(), config);
}

#[test]
fn test_with_tool_version_leaves_original_untouched() {
    let config = HopConfig::new("app", Version::new(0, 16, 0));
    let upgraded = config.with_tool_version(Version::new(0, 17, 5));
    assert_eq!(config.tool_version, Version::new(0, 16, 0));
    assert_eq!(upgraded.tool_version, Version::new(0, 17, 5));
    assert_eq!(upgraded.package_name, "app");
}

#[test]
fn test_display_fields_follow_declared_order() {
    let config = HopConfig::new("app", Version::new(0, 17, 5));
    let fields = config.display_fields();
    let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, HopConfig::DISPLAY_FIELDS);
    assert_eq!(fields[1].1, "0.17.5");
    assert_eq!(fields[5].1, "-");
}

#[test]
fn test_default_database_is_not_written_back() {
    let config = HopConfig::new("app", Version::new(0, 17, 5));
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(!yaml.contains("database"));

    let memory: HopConfig =
        serde_yaml::from_str("package_name: app\ndatabase:\n  path: \":memory:\"\n").unwrap();
    assert_eq!(memory.database_path(), ":memory:");
}
