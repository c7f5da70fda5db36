//! Test doubles for engine collaborators.

use crate::error::{EngineError, EngineResult};
use crate::executor::{ScriptExecutor, UnitRef};
use crate::hook::CodegenHook;
use async_trait::async_trait;
use hop_core::Version;
use hop_ledger::{Ledger, LedgerError, LedgerRecord, LedgerResult};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Executor that records unit names and fails on one chosen unit.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    executed: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(unit: &str) -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            fail_on: Some(unit.to_string()),
        }
    }

    /// Units executed successfully, in order.
    pub fn executed(&self) -> Vec<String> {
        match self.executed.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ScriptExecutor for RecordingExecutor {
    async fn execute(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        if self.fail_on.as_deref() == Some(unit.name) {
            return Err(EngineError::UnitFailed {
                unit: unit.name.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        match self.executed.lock() {
            Ok(mut guard) => guard.push(unit.name.to_string()),
            Err(poisoned) => poisoned.into_inner().push(unit.name.to_string()),
        }
        Ok(())
    }
}

/// Hook that fails after one chosen unit.
#[derive(Debug, Default)]
pub struct FailingHook {
    fail_after: String,
}

impl FailingHook {
    pub fn after(unit: &str) -> Self {
        Self {
            fail_after: unit.to_string(),
        }
    }
}

#[async_trait]
impl CodegenHook for FailingHook {
    async fn after_unit(&self, unit: UnitRef<'_>) -> EngineResult<()> {
        if unit.name == self.fail_after {
            return Err(EngineError::HookFailed {
                unit: unit.name.to_string(),
                message: "simulated codegen failure".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory ledger whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Vec<LedgerRecord>,
    fail_writes: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that refuses every write.
    pub fn read_only() -> Self {
        Self {
            records: Vec::new(),
            fail_writes: true,
        }
    }

    fn check_writable(&self) -> LedgerResult<()> {
        if self.fail_writes {
            return Err(LedgerError::QueryError("ledger is read-only".to_string()));
        }
        Ok(())
    }
}

impl Ledger for MemoryLedger {
    fn has(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.records.iter().any(|r| r.key == key))
    }

    fn get(&self, key: &str) -> LedgerResult<Option<LedgerRecord>> {
        Ok(self.records.iter().find(|r| r.key == key).cloned())
    }

    fn record(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        self.check_writable()?;
        if self.has(key)? {
            return Err(LedgerError::DuplicateRecord {
                key: key.to_string(),
            });
        }
        let record = LedgerRecord::now(key, origin_version);
        self.records.push(record.clone());
        Ok(record)
    }

    fn rerecord(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        self.check_writable()?;
        let record = LedgerRecord::now(key, origin_version);
        match self.records.iter_mut().find(|r| r.key == key) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(record)
    }

    fn list(&self) -> LedgerResult<Vec<LedgerRecord>> {
        Ok(self.records.clone())
    }
}

/// Write a unit file, creating its directory.
pub fn write_unit(dir: &Path, name: &str, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("create unit directory");
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write unit file");
    path
}

/// First line that marks a SQL file as a bootstrap unit.
pub const SQL_BOOTSTRAP_MARKER: &str = "-- @HOP:bootstrap\n";
