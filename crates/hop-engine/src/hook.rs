//! Code generation hook run after every successfully applied unit.

use crate::error::{EngineError, EngineResult};
use crate::executor::UnitRef;
use async_trait::async_trait;
use hop_core::HopConfig;
use std::path::PathBuf;

/// External collaborator that regenerates code from the updated schema.
///
/// A hook failure fails the unit for sequencing purposes; it never touches
/// a ledger.
#[async_trait]
pub trait CodegenHook: Send + Sync {
    async fn after_unit(&self, unit: UnitRef<'_>) -> EngineResult<()>;
}

/// Hook that does nothing.
pub struct NoopHook;

#[async_trait]
impl CodegenHook for NoopHook {
    async fn after_unit(&self, _unit: UnitRef<'_>) -> EngineResult<()> {
        Ok(())
    }
}

/// Runs a configured argv in the repository root.
pub struct CommandHook {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl CommandHook {
    /// Build a hook from an argv. Returns `None` for an empty argv.
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv,
            cwd: cwd.into(),
        })
    }

    /// The hook configured by `codegen_command`, if any.
    pub fn from_config(config: &HopConfig, root: impl Into<PathBuf>) -> Option<Self> {
        config
            .codegen_command
            .clone()
            .and_then(|argv| Self::new(argv, root))
    }
}

#[async_trait]
impl CodegenHook for CommandHook {
    async fn after_unit(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        let (program, args) = match self.argv.split_first() {
            Some(split) => split,
            None => return Ok(()),
        };
        log::debug!("Running code generation after {}", unit.name);

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .env("HOP_PATCH_ID", unit.owner)
            .env("HOP_UNIT_NAME", unit.name)
            .output()
            .await
            .map_err(|e| EngineError::HookFailed {
                unit: unit.name.to_string(),
                message: format!("failed to start '{program}': {e}"),
            })?;

        if !output.status.success() {
            return Err(EngineError::HookFailed {
                unit: unit.name.to_string(),
                message: format!(
                    "'{}' exited with {}: {}",
                    self.argv.join(" "),
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}
