//! Create-patch command implementation

use anyhow::{Context, Result};
use hop_engine::PatchManager;

use crate::cli::{CreatePatchArgs, GlobalArgs};
use crate::commands::common::parse_patch_id;
use crate::context::RuntimeContext;

/// Execute the create-patch command
pub(crate) async fn execute(args: &CreatePatchArgs, global: &GlobalArgs) -> Result<()> {
    let id = parse_patch_id(&args.patch_id)?;
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;

    let manager = PatchManager::new(&ctx.layout, &ctx.config, &ctx.vcs);
    let patch = manager
        .create(&id)
        .with_context(|| format!("Failed to create patch '{id}'"))?;

    println!("Created patch {}", patch.id);
    println!("  Branch:    {}", patch.branch_name());
    println!(
        "  Directory: {}",
        ctx.layout.relative(&ctx.layout.patch_dir(&patch.id)).display()
    );
    Ok(())
}
