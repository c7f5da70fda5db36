//! Storage schema of the DuckDB ledger.
//!
//! `hop_meta.schema_version` holds the layout version of the ledger table so
//! an older tool refuses a ledger written by a newer one instead of
//! misreading it.

use crate::error::{LedgerError, LedgerResult};
use duckdb::Connection;

/// Layout version written by this build.
pub const SCHEMA_VERSION: i32 = 1;

const LEDGER_DDL: &str = include_str!("ledger.sql");

/// Create the ledger table on first use and check the stored layout version.
pub fn ensure_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS hop_meta;
         CREATE TABLE IF NOT EXISTS hop_meta.schema_version (
             version    INTEGER NOT NULL,
             applied_at TIMESTAMP NOT NULL DEFAULT now()
         );",
    )
    .map_err(|e| LedgerError::SchemaError(format!("cannot create hop_meta: {e}")))?;

    let stored: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM hop_meta.schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| LedgerError::SchemaError(format!("cannot read schema version: {e}")))?;

    match stored {
        SCHEMA_VERSION => Ok(()),
        0 => {
            conn.execute_batch(LEDGER_DDL)
                .map_err(|e| LedgerError::SchemaError(format!("cannot create ledger: {e}")))?;
            conn.execute(
                "INSERT INTO hop_meta.schema_version (version) VALUES (?)",
                duckdb::params![SCHEMA_VERSION],
            )
            .map_err(|e| LedgerError::SchemaError(format!("cannot record schema version: {e}")))?;
            log::debug!("Created ledger schema v{SCHEMA_VERSION}");
            Ok(())
        }
        newer => Err(LedgerError::SchemaError(format!(
            "ledger schema v{newer} is newer than the supported v{SCHEMA_VERSION}"
        ))),
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
