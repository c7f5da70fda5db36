//! Bootstrap command implementation

use anyhow::{Context, Result};
use hop_engine::{BootstrapMode, BootstrapRunner};

use crate::cli::{BootstrapArgs, GlobalArgs};
use crate::commands::common::{fail_with, print_section};
use crate::context::RuntimeContext;

/// Execute the bootstrap command
pub(crate) async fn execute(args: &BootstrapArgs, global: &GlobalArgs) -> Result<()> {
    let (ctx, _) = RuntimeContext::load_upgraded(global)?;
    let mode = if args.dry_run {
        BootstrapMode::DryRun
    } else if args.force {
        BootstrapMode::Force
    } else {
        BootstrapMode::Normal
    };

    let backend = ctx.open_database()?;
    let mut ledger = ctx.open_ledger(&backend)?;
    let executor = ctx.executor(backend);

    let dir = ctx.layout.bootstrap_dir();
    println!("Running bootstrap files ({mode})");
    let report = BootstrapRunner::new(&executor, &mut ledger)
        .run(&dir, mode)
        .await
        .context("Failed to run bootstrap files")?;

    print_section("Would run", &report.would_run);
    print_section("Executed", &report.executed);
    if global.verbose {
        print_section("Skipped (already applied)", &report.skipped);
    }

    if let Some(failure) = &report.failed {
        return Err(fail_with(failure));
    }

    println!(
        "\n{} executed, {} skipped, {} pending",
        report.executed.len(),
        report.skipped.len(),
        report.would_run.len()
    );
    Ok(())
}
