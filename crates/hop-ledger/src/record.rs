//! The ledger contract shared by every backing store.

use crate::error::LedgerResult;
use chrono::{DateTime, SubsecRound, Utc};
use hop_core::Version;
use serde::{Deserialize, Serialize};

/// "This named unit has been applied"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Unique key: a bootstrap file name or a migration step version
    pub key: String,

    /// Version the unit originates from
    pub origin_version: Version,

    /// When the unit was (last) applied
    pub applied_at: DateTime<Utc>,
}

impl LedgerRecord {
    /// A record stamped with the current time.
    ///
    /// Truncated to microseconds, the precision of a DuckDB `TIMESTAMP`, so
    /// a record reads back exactly as it was written.
    pub fn now(key: impl Into<String>, origin_version: Version) -> Self {
        Self {
            key: key.into(),
            origin_version,
            applied_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Durable, keyed, append-only record of applied units.
///
/// A record's presence is the only idempotency signal: absent means "must
/// run", present means "must skip unless forced". Callers write the record
/// only after the guarded action fully succeeded.
pub trait Ledger {
    /// Whether `key` has been recorded.
    fn has(&self, key: &str) -> LedgerResult<bool>;

    /// Fetch a single record.
    fn get(&self, key: &str) -> LedgerResult<Option<LedgerRecord>>;

    /// Record `key`; fails with `DuplicateRecord` if it is already present.
    fn record(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord>;

    /// Record `key`, overwriting the timestamp and origin of an existing
    /// record instead of failing. Used by forced re-execution; the record
    /// keeps its original insertion position.
    fn rerecord(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord>;

    /// All records in insertion order.
    fn list(&self) -> LedgerResult<Vec<LedgerRecord>>;
}
