use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn test_bootstrap_flags_conflict() {
    let result = Cli::try_parse_from(["hop", "bootstrap", "--dry-run", "--force"]);
    assert!(result.is_err());
}

#[test]
fn test_prepare_release_level() {
    let cli = Cli::try_parse_from(["hop", "prepare-release", "minor"]).unwrap();
    match cli.command {
        Commands::PrepareRelease(args) => {
            assert_eq!(BumpKind::from(args.level), BumpKind::Minor);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_prepare_release_rejects_unknown_level() {
    assert!(Cli::try_parse_from(["hop", "prepare-release", "huge"]).is_err());
}

#[test]
fn test_reconcile_bootstrap_list() {
    let cli = Cli::try_parse_from([
        "hop",
        "reconcile",
        "--bootstrap",
        "1-seed-0.1.0.sql,2-more-0.2.0.sql",
    ])
    .unwrap();
    match cli.command {
        Commands::Reconcile(args) => {
            assert_eq!(args.bootstrap, vec!["1-seed-0.1.0.sql", "2-more-0.2.0.sql"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["hop", "status", "-v", "-p", "/tmp/repo"]).unwrap();
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, PathBuf::from("/tmp/repo"));
}
