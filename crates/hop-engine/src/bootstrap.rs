//! Bootstrap Runner: applies data-initialization files once per ledger.

use crate::error::{EngineError, EngineResult};
use crate::executor::{ScriptExecutor, UnitRef};
use crate::runner::UnitFailure;
use hop_core::discover_bootstrap;
use hop_ledger::Ledger;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// How ledger state is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMode {
    /// Execute unrecorded files, skip recorded ones
    #[default]
    Normal,
    /// Execute nothing, write nothing, report what would run
    DryRun,
    /// Execute every file and re-record it
    Force,
}

impl fmt::Display for BootstrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapMode::Normal => write!(f, "normal"),
            BootstrapMode::DryRun => write!(f, "dry-run"),
            BootstrapMode::Force => write!(f, "force"),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct BootstrapReport {
    pub executed: Vec<String>,
    pub skipped: Vec<String>,
    pub would_run: Vec<String>,
    pub failed: Option<UnitFailure>,
}

impl BootstrapReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

pub struct BootstrapRunner<'a> {
    executor: &'a dyn ScriptExecutor,
    ledger: &'a mut dyn Ledger,
}

impl<'a> BootstrapRunner<'a> {
    pub fn new(executor: &'a dyn ScriptExecutor, ledger: &'a mut dyn Ledger) -> Self {
        Self { executor, ledger }
    }

    /// Run the tagged files in `dir` in ascending numeric order.
    ///
    /// Discovery problems (duplicate numbers, unreadable files) are errors
    /// raised before anything executes. The first failing file, or the first
    /// record that cannot be written, stops the run and is reported in
    /// [`BootstrapReport::failed`].
    pub async fn run(&mut self, dir: &Path, mode: BootstrapMode) -> EngineResult<BootstrapReport> {
        let files = discover_bootstrap(dir)?;
        log::debug!("{} bootstrap candidate(s) in {}", files.len(), dir.display());

        let mut report = BootstrapReport::default();
        for file in &files {
            let previous = self.ledger.get(&file.name)?;

            match (mode, &previous) {
                (BootstrapMode::DryRun, _) => {
                    if previous.is_some() {
                        report.skipped.push(file.name.clone());
                    } else {
                        report.would_run.push(file.name.clone());
                    }
                    continue;
                }
                (BootstrapMode::Normal, Some(record)) => {
                    log::info!("Skipping {} (applied {})", file.name, record.applied_at);
                    report.skipped.push(file.name.clone());
                    continue;
                }
                (BootstrapMode::Force, Some(record)) => {
                    log::info!("Re-running {} (last applied {})", file.name, record.applied_at);
                }
                (_, None) => {}
            }

            if let Err(error) = self.executor.execute(UnitRef::from(file)).await {
                report.failed = Some(UnitFailure {
                    unit: file.name.clone(),
                    error,
                });
                break;
            }

            let written = match mode {
                BootstrapMode::Force => self.ledger.rerecord(&file.name, file.version),
                _ => self.ledger.record(&file.name, file.version),
            };
            if let Err(source) = written {
                log::error!(
                    "Bootstrap file {} ran but was not recorded: {source}. \
                     Run `hop reconcile --bootstrap {}` once the ledger is reachable.",
                    file.name,
                    file.name
                );
                report.executed.push(file.name.clone());
                report.failed = Some(UnitFailure {
                    unit: file.name.clone(),
                    error: EngineError::TrackingGap {
                        key: file.name.clone(),
                        source,
                    },
                });
                break;
            }

            log::info!("Applied bootstrap file {}", file.name);
            report.executed.push(file.name.clone());
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod tests;
