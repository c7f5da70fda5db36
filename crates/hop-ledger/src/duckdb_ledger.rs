//! DuckDB-backed ledger stored in the target database.
//!
//! Keeping the ledger next to the data it guards means a restored database
//! carries its own idempotency history.

use crate::error::{LedgerError, LedgerResult};
use crate::schema::ensure_schema;
use crate::record::{Ledger, LedgerRecord};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::Connection;
use hop_core::Version;
use std::path::Path;

const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Ledger table `hop_meta.ledger` behind a DuckDB connection.
///
/// Single-threaded: the engine drives one ordered run at a time.
pub struct DuckDbLedger {
    conn: Connection,
}

impl DuckDbLedger {
    /// Open (or create) a ledger database at `path`.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| LedgerError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory ledger for tests that don't need persistence.
    pub fn open_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LedgerError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Wrap an existing connection (typically cloned from the script
    /// executor's backend), creating the ledger table if needed.
    pub fn from_connection(conn: Connection) -> LedgerResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    pub fn transaction<F, T>(&self, body: F) -> LedgerResult<T>
    where
        F: FnOnce(&Connection) -> LedgerResult<T>,
    {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| LedgerError::TransactionError(format!("BEGIN failed: {e}")))?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(LedgerError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
        }
        result
    }
}

fn key_exists(conn: &Connection, key: &str) -> LedgerResult<bool> {
    let count: i64 = conn
        .query_row(
            r#"SELECT COUNT(*) FROM hop_meta.ledger WHERE "key" = ?"#,
            duckdb::params![key],
            |row| row.get(0),
        )
        .map_err(|e| LedgerError::QueryError(format!("lookup '{key}': {e}")))?;
    Ok(count > 0)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_WRITE_FORMAT).to_string()
}

/// Build a record from raw column strings.
fn decode_row(key: String, origin: String, applied_at: String) -> LedgerResult<LedgerRecord> {
    let corrupt = |reason: String| LedgerError::Corrupt {
        location: "hop_meta.ledger".to_string(),
        reason,
    };
    let origin_version: Version = origin
        .parse()
        .map_err(|e| corrupt(format!("key '{key}': {e}")))?;
    let applied_at = NaiveDateTime::parse_from_str(&applied_at, TIMESTAMP_READ_FORMAT)
        .map_err(|e| corrupt(format!("key '{key}': bad timestamp '{applied_at}': {e}")))?
        .and_utc();
    Ok(LedgerRecord {
        key,
        origin_version,
        applied_at,
    })
}

impl Ledger for DuckDbLedger {
    fn has(&self, key: &str) -> LedgerResult<bool> {
        key_exists(&self.conn, key)
    }

    fn get(&self, key: &str) -> LedgerResult<Option<LedgerRecord>> {
        let row = self.conn.query_row(
            r#"SELECT "key", origin_version, CAST(applied_at AS VARCHAR)
               FROM hop_meta.ledger WHERE "key" = ?"#,
            duckdb::params![key],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );
        match row {
            Ok((key, origin, applied_at)) => decode_row(key, origin, applied_at).map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(LedgerError::QueryError(format!("get '{key}': {e}"))),
        }
    }

    fn record(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        let record = LedgerRecord::now(key, origin_version);
        self.transaction(|conn| {
            if key_exists(conn, key)? {
                return Err(LedgerError::DuplicateRecord {
                    key: key.to_string(),
                });
            }
            conn.execute(
                r#"INSERT INTO hop_meta.ledger ("key", origin_version, applied_at)
                   VALUES (?, ?, CAST(? AS TIMESTAMP))"#,
                duckdb::params![
                    record.key,
                    record.origin_version.to_string(),
                    format_timestamp(&record.applied_at)
                ],
            )
            .map_err(|e| LedgerError::QueryError(format!("record '{key}': {e}")))?;
            Ok(())
        })?;
        log::debug!("Ledger recorded '{key}' ({origin_version})");
        Ok(record)
    }

    fn rerecord(&mut self, key: &str, origin_version: Version) -> LedgerResult<LedgerRecord> {
        let record = LedgerRecord::now(key, origin_version);
        self.transaction(|conn| {
            let updated = conn
                .execute(
                    r#"UPDATE hop_meta.ledger
                       SET origin_version = ?, applied_at = CAST(? AS TIMESTAMP)
                       WHERE "key" = ?"#,
                    duckdb::params![
                        record.origin_version.to_string(),
                        format_timestamp(&record.applied_at),
                        record.key
                    ],
                )
                .map_err(|e| LedgerError::QueryError(format!("rerecord '{key}': {e}")))?;
            if updated == 0 {
                conn.execute(
                    r#"INSERT INTO hop_meta.ledger ("key", origin_version, applied_at)
                       VALUES (?, ?, CAST(? AS TIMESTAMP))"#,
                    duckdb::params![
                        record.key,
                        record.origin_version.to_string(),
                        format_timestamp(&record.applied_at)
                    ],
                )
                .map_err(|e| LedgerError::QueryError(format!("rerecord '{key}': {e}")))?;
            }
            Ok(())
        })?;
        log::debug!("Ledger re-recorded '{key}' ({origin_version})");
        Ok(record)
    }

    fn list(&self) -> LedgerResult<Vec<LedgerRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"SELECT "key", origin_version, CAST(applied_at AS VARCHAR)
                   FROM hop_meta.ledger ORDER BY seq"#,
            )
            .map_err(|e| LedgerError::QueryError(format!("prepare list: {e}")))?;

        let rows: Vec<(String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(|e| LedgerError::QueryError(format!("query list: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LedgerError::QueryError(format!("collect list: {e}")))?;

        rows.into_iter()
            .map(|(key, origin, applied_at)| decode_row(key, origin, applied_at))
            .collect()
    }
}

#[cfg(test)]
#[path = "duckdb_ledger_test.rs"]
mod tests;
