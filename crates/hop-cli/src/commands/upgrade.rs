//! Upgrade command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;

/// Execute the upgrade command
///
/// Loading the context already runs the sequencer; this only reports it.
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, report) = RuntimeContext::load_upgraded(global)?;

    if report.applied.is_empty() {
        println!("Repository is up to date ({})", report.to);
        return Ok(());
    }
    println!("Upgraded repository from {} to {}", report.from, report.to);
    for version in &report.applied {
        println!("  applied step {version}");
    }
    Ok(())
}
