//! Script Runner: applies a patch's units in ascending sequence order.
//!
//! The first failing unit stops the run. Units applied before it stay
//! applied; nothing is reversed.

use crate::error::{EngineError, EngineResult};
use crate::executor::{ScriptExecutor, UnitRef};
use crate::hook::CodegenHook;
use hop_core::ScriptUnit;
use serde::Serialize;

/// Whether units are executed or only checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Execute,
    /// Validate ordering and presence without invoking the executor
    DryRun,
}

/// The unit that stopped a run, with its error.
#[derive(Debug, Serialize)]
pub struct UnitFailure {
    pub unit: String,
    #[serde(serialize_with = "crate::error::serialize_message")]
    pub error: EngineError,
}

/// Outcome of an ordered run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Units that ran to completion, in order
    pub applied: Vec<String>,
    /// Units a dry run would have executed
    pub would_run: Vec<String>,
    /// The failing unit, if the run stopped early
    pub failed: Option<UnitFailure>,
    /// Units after the failing one, never started
    pub not_attempted: Vec<String>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Applies ordered units through an executor, running the code generation
/// hook after each one.
pub struct ScriptRunner<'a> {
    executor: &'a dyn ScriptExecutor,
    hook: &'a dyn CodegenHook,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(executor: &'a dyn ScriptExecutor, hook: &'a dyn CodegenHook) -> Self {
        Self { executor, hook }
    }

    /// Apply `units`, which must be in strictly ascending sequence order.
    ///
    /// Ordering and presence are checked for every unit before the first
    /// one executes; a violation is an error and nothing runs. Execution
    /// failures are reported in the returned [`RunReport`].
    pub async fn apply(&self, units: &[ScriptUnit], mode: RunMode) -> EngineResult<RunReport> {
        check_units(units)?;

        let mut report = RunReport::default();
        if mode == RunMode::DryRun {
            report.would_run = units.iter().map(|u| u.name.clone()).collect();
            return Ok(report);
        }

        for (idx, unit) in units.iter().enumerate() {
            let unit_ref = UnitRef::from(unit);
            let outcome = match self.executor.execute(unit_ref).await {
                Ok(()) => self.hook.after_unit(unit_ref).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => {
                    log::debug!("Applied {}", unit.name);
                    report.applied.push(unit.name.clone());
                }
                Err(error) => {
                    log::debug!("Unit {} failed: {error}", unit.name);
                    report.failed = Some(UnitFailure {
                        unit: unit.name.clone(),
                        error,
                    });
                    report.not_attempted =
                        units[idx + 1..].iter().map(|u| u.name.clone()).collect();
                    break;
                }
            }
        }
        Ok(report)
    }
}

fn check_units(units: &[ScriptUnit]) -> EngineResult<()> {
    let mut previous: Option<u64> = None;
    for unit in units {
        if let Some(prev) = previous {
            if unit.sequence_number <= prev {
                return Err(EngineError::UnitOrder {
                    unit: unit.name.clone(),
                    sequence: unit.sequence_number,
                    previous: prev,
                });
            }
        }
        if !unit.path.is_file() {
            return Err(EngineError::MissingUnit {
                path: unit.path.display().to_string(),
            });
        }
        previous = Some(unit.sequence_number);
    }
    Ok(())
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
