//! Promote-release command implementation

use anyhow::{Context, Result};
use hop_engine::ReleaseStager;

use crate::cli::{GlobalArgs, PromoteReleaseArgs};
use crate::context::RuntimeContext;

/// Execute the promote-release command
pub(crate) async fn execute(args: &PromoteReleaseArgs, global: &GlobalArgs) -> Result<()> {
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;

    let stager = ReleaseStager::new(&ctx.layout, &ctx.config, &ctx.vcs);
    let release = stager
        .promote(&args.message)
        .context("Failed to promote the open release")?;

    println!(
        "Released {} ({} patch(es))",
        release.version,
        release.stage_entries.len()
    );
    for entry in &release.stage_entries {
        println!("  {entry}");
    }
    println!(
        "  Manifest: {}",
        ctx.layout
            .relative(&ctx.layout.manifest_file(release.version))
            .display()
    );
    Ok(())
}
