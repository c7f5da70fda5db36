//! Prepare-release command implementation

use anyhow::{Context, Result};
use hop_core::BumpKind;
use hop_engine::ReleaseStager;

use crate::cli::{GlobalArgs, PrepareReleaseArgs};
use crate::context::RuntimeContext;

/// Execute the prepare-release command
pub(crate) async fn execute(args: &PrepareReleaseArgs, global: &GlobalArgs) -> Result<()> {
    let kind = BumpKind::from(args.level);
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;

    let stager = ReleaseStager::new(&ctx.layout, &ctx.config, &ctx.vcs);
    let last = stager.last_released()?;
    let version = stager
        .prepare(kind)
        .with_context(|| format!("Failed to prepare {kind} release"))?;

    println!("Prepared release {version} (previous: {last})");
    println!(
        "  Stage file: {}",
        ctx.layout.relative(&ctx.layout.stage_file(version)).display()
    );
    Ok(())
}
