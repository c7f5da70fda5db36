//! Add-to-release command implementation

use anyhow::{Context, Result};
use hop_engine::ReleaseStager;

use crate::cli::{AddToReleaseArgs, GlobalArgs};
use crate::commands::common::parse_patch_id;
use crate::context::RuntimeContext;

/// Execute the add-to-release command
pub(crate) async fn execute(args: &AddToReleaseArgs, global: &GlobalArgs) -> Result<()> {
    let id = parse_patch_id(&args.patch_id)?;
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;

    let stager = ReleaseStager::new(&ctx.layout, &ctx.config, &ctx.vcs);
    let release = stager
        .add_to_release(&id)
        .with_context(|| format!("Failed to add '{id}' to the open release"))?;

    println!("Added {id} to release {}", release.version);
    for (position, entry) in release.stage_entries.iter().enumerate() {
        println!("  {:>3}. {entry}", position + 1);
    }
    Ok(())
}
