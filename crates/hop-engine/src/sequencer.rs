//! Migration Sequencer: brings a repository's structure up to the tool's
//! version by applying registered steps in order, each exactly once.

use crate::error::{EngineError, EngineResult};
use crate::steps::{MigrationStep, StepContext, STEPS};
use crate::vcs::Vcs;
use hop_core::{write_atomic, CoreError, HopConfig, RepoLayout, Version};
use hop_ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of [`MigrationSequencer::apply_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and was recorded; carries the paths it touched
    Applied(Vec<PathBuf>),
    /// The step was already recorded or covered by the declared version
    AlreadyApplied,
}

/// Summary of an upgrade run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    pub from: Version,
    pub to: Version,
    pub applied: Vec<Version>,
}

/// Repository-relative paths touched by recorded steps whose upgrade commit
/// has not happened yet. Survives a failed run so the next one commits them.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PendingCommit {
    paths: Vec<PathBuf>,
}

impl PendingCommit {
    fn load(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        Ok(serde_json::from_str(&content).map_err(CoreError::from)?)
    }

    fn save(&self, path: &Path) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(CoreError::from)?;
        Ok(write_atomic(path, json.as_bytes())?)
    }

    fn clear(path: &Path) -> EngineResult<()> {
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| EngineError::io(path, e))?;
        }
        Ok(())
    }
}

pub struct MigrationSequencer<'a> {
    steps: &'a [MigrationStep],
    layout: &'a RepoLayout,
    vcs: &'a dyn Vcs,
}

impl<'a> MigrationSequencer<'a> {
    /// Sequencer over the registered step table.
    pub fn new(layout: &'a RepoLayout, vcs: &'a dyn Vcs) -> EngineResult<Self> {
        Self::with_steps(STEPS, layout, vcs)
    }

    /// Sequencer over a custom step table, which must be strictly ascending.
    pub fn with_steps(
        steps: &'a [MigrationStep],
        layout: &'a RepoLayout,
        vcs: &'a dyn Vcs,
    ) -> EngineResult<Self> {
        validate_steps(steps)?;
        Ok(Self { steps, layout, vcs })
    }

    pub fn steps(&self) -> &'a [MigrationStep] {
        self.steps
    }

    /// Highest recorded step version, or the declared tool version if that
    /// is higher (a freshly initialised repository has no records).
    pub fn current_version(&self, ledger: &dyn Ledger, declared: Version) -> EngineResult<Version> {
        let recorded = ledger
            .list()?
            .into_iter()
            .map(|r| r.origin_version)
            .max()
            .unwrap_or_default();
        Ok(recorded.max(declared))
    }

    /// Steps strictly newer than `current`, ascending.
    pub fn pending_steps(&self, current: Version) -> Vec<&'a MigrationStep> {
        self.steps.iter().filter(|s| s.version > current).collect()
    }

    /// Apply one step and record it.
    ///
    /// A step that is already recorded, or at or below the current version,
    /// is a successful no-op. Requesting a step while an older one is still
    /// pending fails without running anything.
    pub fn apply_step(
        &self,
        step: &MigrationStep,
        ledger: &mut dyn Ledger,
        declared: Version,
    ) -> EngineResult<StepOutcome> {
        let key = step.key();
        if ledger.has(&key)? {
            log::debug!("Migration step {key} already recorded");
            return Ok(StepOutcome::AlreadyApplied);
        }
        let current = self.current_version(ledger, declared)?;
        if step.version <= current {
            log::debug!("Migration step {key} covered by current version {current}");
            return Ok(StepOutcome::AlreadyApplied);
        }
        if let Some(first) = self.pending_steps(current).first() {
            if first.version < step.version {
                return Err(EngineError::StepOutOfOrder {
                    requested: step.version,
                    pending: first.version,
                });
            }
        }

        let ctx = StepContext {
            layout: self.layout,
        };
        let touched = (step.apply)(&ctx)?;
        self.remember_touched(&touched)?;

        if let Err(source) = ledger.record(&key, step.version) {
            log::error!(
                "Migration step {key} succeeded but was not recorded: {source}. \
                 Run `hop reconcile` after fixing the ledger."
            );
            return Err(EngineError::TrackingGap { key, source });
        }
        Ok(StepOutcome::Applied(touched))
    }

    /// Add a step's files to the pending upgrade commit before the step is
    /// recorded, so a later run still commits them if this one stops early.
    fn remember_touched(&self, touched: &[PathBuf]) -> EngineResult<()> {
        if touched.is_empty() {
            return Ok(());
        }
        let path = self.layout.upgrade_pending_path();
        let mut pending = PendingCommit::load(&path)?;
        pending
            .paths
            .extend(touched.iter().map(|p| self.layout.relative(p)));
        pending.save(&path)
    }

    /// Apply every pending step, then raise the declared tool version and
    /// commit the touched files.
    ///
    /// The commit also carries files of steps recorded by an earlier run that
    /// failed before committing.
    pub fn run(&self, ledger: &mut dyn Ledger, config: &HopConfig) -> EngineResult<UpgradeReport> {
        let from = self.current_version(ledger, config.tool_version)?;
        let mut reached = from;
        let mut applied = Vec::new();

        for step in self.pending_steps(from) {
            log::info!("Applying migration step {} ({})", step.version, step.description);
            match self.apply_step(step, ledger, config.tool_version) {
                Ok(StepOutcome::Applied(_)) => applied.push(step.version),
                Ok(StepOutcome::AlreadyApplied) => {}
                Err(source) => {
                    return Err(EngineError::MigrationFailed {
                        version: step.version,
                        description: step.description,
                        reached,
                        source: Box::new(source),
                    });
                }
            }
            reached = step.version;
        }

        let pending_path = self.layout.upgrade_pending_path();
        let pending = PendingCommit::load(&pending_path)?;
        if reached > config.tool_version || !pending.paths.is_empty() {
            let config_path = self.layout.config_path();
            if reached > config.tool_version {
                config.with_tool_version(reached).save(&config_path)?;
            }
            let mut paths = pending.paths;
            paths.push(self.layout.relative(&config_path));

            let ledger_path = self.layout.migration_ledger_path();
            if ledger_path.exists() {
                paths.push(self.layout.relative(&ledger_path));
            }
            paths.sort();
            paths.dedup();
            self.vcs
                .commit(&paths, &format!("[HOP] Upgrade repository to {reached}"))?;
            PendingCommit::clear(&pending_path)?;
            log::info!("Repository upgraded from {from} to {reached}");
        }

        Ok(UpgradeReport {
            from,
            to: reached,
            applied,
        })
    }
}

fn validate_steps(steps: &[MigrationStep]) -> EngineResult<()> {
    for pair in steps.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(EngineError::StepTable {
                reason: format!(
                    "step {} is registered after {}",
                    pair[1].version, pair[0].version
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sequencer_test.rs"]
mod tests;
