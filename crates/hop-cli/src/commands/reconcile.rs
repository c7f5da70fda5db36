//! Reconcile command implementation
//!
//! Runs before the upgrade so that steps already reflected in the declared
//! tool version get recorded instead of re-applied.

use anyhow::{Context, Result};
use hop_engine::{reconcile_bootstrap, reconcile_migrations, EngineError, ReconcileReport, STEPS};
use hop_ledger::FileLedger;

use crate::cli::{GlobalArgs, ReconcileArgs};
use crate::context::RuntimeContext;

/// Execute the reconcile command
pub(crate) async fn execute(args: &ReconcileArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;

    let mut migrations = FileLedger::open(&ctx.layout.migration_ledger_path())
        .map_err(EngineError::from)
        .context("Failed to open migration ledger")?;
    let mut report = ReconcileReport {
        migrations: reconcile_migrations(STEPS, &mut migrations, ctx.config.tool_version)?,
        ..ReconcileReport::default()
    };

    if !args.bootstrap.is_empty() {
        let backend = ctx.open_database()?;
        let mut ledger = ctx.open_ledger(&backend)?;
        report.bootstrap =
            reconcile_bootstrap(&ctx.layout.bootstrap_dir(), &mut ledger, &args.bootstrap)?;
    }

    if report.migrations.is_empty() && report.bootstrap.is_empty() {
        println!("Nothing to reconcile");
        return Ok(());
    }
    for version in &report.migrations {
        println!("Recorded migration step {version}");
    }
    for name in &report.bootstrap {
        println!("Recorded bootstrap file {name}");
    }
    Ok(())
}
