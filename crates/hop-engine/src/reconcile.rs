//! Ledger repair after a tracking gap.
//!
//! A guarded action can succeed and its record still fail to persist.
//! These operations restore the missing records from observable state
//! without re-running anything.

use crate::error::{EngineError, EngineResult};
use crate::steps::MigrationStep;
use hop_core::{discover_bootstrap, Version};
use hop_ledger::Ledger;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Migration steps recorded
    pub migrations: Vec<Version>,
    /// Bootstrap files recorded
    pub bootstrap: Vec<String>,
}

/// Record every step at or below the declared tool version that has no
/// record. The declared version is only raised after all steps up to it
/// succeeded, so it proves those steps ran.
pub fn reconcile_migrations(
    steps: &[MigrationStep],
    ledger: &mut dyn Ledger,
    declared: Version,
) -> EngineResult<Vec<Version>> {
    let mut recorded = Vec::new();
    for step in steps.iter().filter(|s| s.version <= declared) {
        let key = step.key();
        if ledger.has(&key)? {
            continue;
        }
        ledger.record(&key, step.version)?;
        log::info!("Reconciled migration step {key}");
        recorded.push(step.version);
    }
    Ok(recorded)
}

/// Record bootstrap files the operator asserts were applied.
///
/// Every name must be a tagged bootstrap file in `dir`; an unknown name
/// fails before anything is written. Names already recorded are left alone.
pub fn reconcile_bootstrap(
    dir: &Path,
    ledger: &mut dyn Ledger,
    names: &[String],
) -> EngineResult<Vec<String>> {
    let files = discover_bootstrap(dir)?;
    let mut selected = Vec::new();
    for name in names {
        let file = files
            .iter()
            .find(|f| &f.name == name)
            .ok_or_else(|| EngineError::UnknownBootstrapFile { name: name.clone() })?;
        selected.push(file);
    }

    let mut recorded = Vec::new();
    for file in selected {
        if ledger.has(&file.name)? {
            continue;
        }
        ledger.record(&file.name, file.version)?;
        log::info!("Reconciled bootstrap file {}", file.name);
        recorded.push(file.name.clone());
    }
    Ok(recorded)
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
