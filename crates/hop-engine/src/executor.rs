//! Script execution seam.
//!
//! SQL units run as a single batch through the [`Database`]; procedural
//! units run as a subprocess of the configured interpreter, which receives
//! the database location and unit identity through the environment:
//!
//! - `HOP_DATABASE_PATH`: DuckDB file path (or `:memory:`)
//! - `HOP_PATCH_ID`: patch the unit belongs to
//! - `HOP_UNIT_NAME`: file name of the unit

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use hop_core::{BootstrapFile, ScriptKind, ScriptUnit};
use hop_db::Database;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Borrowed view of a unit to execute, patch script or bootstrap file alike.
#[derive(Debug, Clone, Copy)]
pub struct UnitRef<'a> {
    /// File name, used as the unit's identity in reports and the ledger
    pub name: &'a str,
    pub kind: ScriptKind,
    pub path: &'a Path,
    /// Patch the unit came from
    pub owner: &'a str,
}

impl<'a> From<&'a ScriptUnit> for UnitRef<'a> {
    fn from(unit: &'a ScriptUnit) -> Self {
        Self {
            name: &unit.name,
            kind: unit.kind,
            path: &unit.path,
            owner: unit.patch_id.as_str(),
        }
    }
}

impl<'a> From<&'a BootstrapFile> for UnitRef<'a> {
    fn from(file: &'a BootstrapFile) -> Self {
        Self {
            name: &file.name,
            kind: file.kind,
            path: &file.path,
            owner: &file.unit_id,
        }
    }
}

/// Runs one unit against the target schema.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, unit: UnitRef<'_>) -> EngineResult<()>;
}

/// Executor backed by a [`Database`] and a procedural interpreter.
pub struct DbScriptExecutor {
    db: Arc<dyn Database>,
    database_path: String,
    interpreter: String,
}

impl DbScriptExecutor {
    pub fn new(
        db: Arc<dyn Database>,
        database_path: impl Into<String>,
        interpreter: impl Into<String>,
    ) -> Self {
        Self {
            db,
            database_path: database_path.into(),
            interpreter: interpreter.into(),
        }
    }

    async fn execute_sql(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        let sql = read_unit(unit.path)?;
        if sql.trim().is_empty() {
            log::warn!("Unit {} is empty", unit.name);
            return Ok(());
        }
        self.db
            .run_script(&sql)
            .await
            .map_err(|e| EngineError::UnitFailed {
                unit: unit.name.to_string(),
                message: e.to_string(),
            })
    }

    async fn execute_procedural(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        if !unit.path.is_file() {
            return Err(EngineError::MissingUnit {
                path: unit.path.display().to_string(),
            });
        }
        let env = build_env_vars(unit, &self.database_path);
        let output = tokio::process::Command::new(&self.interpreter)
            .arg(unit.path)
            .envs(&env)
            .output()
            .await
            .map_err(|e| EngineError::UnitFailed {
                unit: unit.name.to_string(),
                message: format!("failed to start '{}': {e}", self.interpreter),
            })?;

        if !output.status.success() {
            return Err(EngineError::UnitFailed {
                unit: unit.name.to_string(),
                message: format!(
                    "{} exited with {}:\n{}",
                    self.interpreter,
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ScriptExecutor for DbScriptExecutor {
    async fn execute(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        log::debug!("Executing {} ({})", unit.name, unit.kind);
        match unit.kind {
            ScriptKind::Sql => self.execute_sql(unit).await,
            ScriptKind::Procedural => self.execute_procedural(unit).await,
        }
    }
}

fn read_unit(path: &Path) -> EngineResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EngineError::MissingUnit {
            path: path.display().to_string(),
        },
        _ => EngineError::io(path, e),
    })
}

fn build_env_vars(unit: UnitRef<'_>, database_path: &str) -> HashMap<&'static str, String> {
    HashMap::from([
        ("HOP_DATABASE_PATH", database_path.to_string()),
        ("HOP_PATCH_ID", unit.owner.to_string()),
        ("HOP_UNIT_NAME", unit.name.to_string()),
    ])
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
