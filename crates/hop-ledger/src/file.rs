//! JSON-file ledger.
//!
//! Used for the repository's own migration steps, which must be trackable
//! before any database is reachable. The whole file is rewritten atomically
//! on every record.

use crate::error::{LedgerError, LedgerResult};
use crate::record::{Ledger, LedgerRecord};
use hop_core::{write_atomic, Version};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LedgerDocument {
    records: Vec<LedgerRecord>,
}

/// A ledger persisted as a JSON document.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    records: Vec<LedgerRecord>,
}

impl FileLedger {
    /// Load the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let records = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| hop_core::CoreError::IoWithPath {
                    path: path.display().to_string(),
                    source: e,
                })?;
            let doc: LedgerDocument =
                serde_json::from_str(&content).map_err(|e| LedgerError::Corrupt {
                    location: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            check_unique(&doc.records, path)?;
            doc.records
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Path the ledger persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: Vec<LedgerRecord>) -> LedgerResult<Vec<LedgerRecord>> {
        let doc = LedgerDocument { records };
        let mut json = serde_json::to_string_pretty(&doc).map_err(hop_core::CoreError::from)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        Ok(doc.records)
    }
}

fn check_unique(records: &[LedgerRecord], path: &Path) -> LedgerResult<()> {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.key.as_str()) {
            return Err(LedgerError::Corrupt {
                location: path.display().to_string(),
                reason: format!("key '{}' recorded twice", record.key),
            });
        }
    }
    Ok(())
}

impl Ledger for FileLedger {
    fn has(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.records.iter().any(|r| r.key == key))
    }

    fn get(&self, key: &str) -> LedgerResult<Option<LedgerRecord>> {
        Ok(self.records.iter().find(|r| r.key == key).cloned())
    }

    fn record(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        if self.has(key)? {
            return Err(LedgerError::DuplicateRecord {
                key: key.to_string(),
            });
        }
        let record = LedgerRecord::now(key, origin_version);
        let mut next = self.records.clone();
        next.push(record.clone());
        // In-memory state only advances once the file is durable.
        self.records = self.persist(next)?;
        log::debug!("Ledger recorded '{key}' in {}", self.path.display());
        Ok(record)
    }

    fn rerecord(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        let record = LedgerRecord::now(key, origin_version);
        let mut next = self.records.clone();
        match next.iter_mut().find(|r| r.key == key) {
            Some(existing) => *existing = record.clone(),
            None => next.push(record.clone()),
        }
        self.records = self.persist(next)?;
        log::debug!("Ledger re-recorded '{key}' in {}", self.path.display());
        Ok(record)
    }

    fn list(&self) -> LedgerResult<Vec<LedgerRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
