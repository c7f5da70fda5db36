//! Apply-patch command implementation

use anyhow::{Context, Result};
use hop_core::{PatchId, PATCH_BRANCH_PREFIX};
use hop_engine::{EngineError, PatchManager, RunMode, ScriptRunner, Vcs};

use crate::cli::{ApplyPatchArgs, GlobalArgs};
use crate::commands::common::{parse_patch_id, print_section};
use crate::context::RuntimeContext;

/// Execute the apply-patch command
pub(crate) async fn execute(args: &ApplyPatchArgs, global: &GlobalArgs) -> Result<()> {
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;
    let id = match &args.patch_id {
        Some(raw) => parse_patch_id(raw)?,
        None => patch_from_branch(&ctx)?,
    };
    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Execute
    };

    let backend = ctx.open_database()?;
    let executor = ctx.executor(backend);
    let hook = ctx.hook();
    let runner = ScriptRunner::new(&executor, hook.as_ref());
    let manager = PatchManager::new(&ctx.layout, &ctx.config, &ctx.vcs);

    if args.dry_run {
        println!("Dry run - checking patch {id}");
    } else {
        println!("Applying patch {id}");
    }

    let report = manager
        .apply(&id, &runner, mode)
        .await
        .with_context(|| format!("Failed to apply patch '{id}'"))?;

    print_section("Would run", &report.would_run);
    print_section("Applied", &report.applied);
    if !args.dry_run {
        println!("\nPatch {id} applied ({} unit(s))", report.applied.len());
    }
    Ok(())
}

/// Patch whose branch is checked out.
fn patch_from_branch(ctx: &RuntimeContext) -> Result<PatchId> {
    let branch = ctx.vcs.current_branch()?;
    match PatchId::from_branch(&branch) {
        Some(id) => Ok(id),
        None => Err(EngineError::WrongBranch {
            expected: format!("{PATCH_BRANCH_PREFIX}<id>"),
            actual: branch,
        }
        .into()),
    }
}
