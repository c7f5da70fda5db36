//! Init command implementation - sets up a hop repository in a git work tree

use anyhow::{Context, Result};
use hop_core::RepoLayout;
use hop_engine::GitCli;

use crate::cli::{GlobalArgs, InitArgs};
use crate::context::ensure_git_repository;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = global.project_dir.as_path();
    ensure_git_repository(root)?;

    let layout = RepoLayout::new(root);
    let vcs = GitCli::new(root);
    let config = hop_engine::init(&layout, &args.package_name, &args.production_branch, &vcs)
        .with_context(|| format!("Failed to initialize '{}'", args.package_name))?;

    println!("Initialized hop repository: {}\n", config.package_name);
    for (field, value) in config.display_fields() {
        println!("  {field}: {value}");
    }
    println!("\nNext: hop create-patch <patch-id>");
    Ok(())
}
