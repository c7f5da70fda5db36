//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const MEMORY_PATH: &str = ":memory:";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    path: String,
}

impl DuckDbBackend {
    /// Open a private in-memory database
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::wrap(conn, MEMORY_PATH.to_string()))
    }

    /// Open (or create) a database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::wrap(conn, path.display().to_string()))
    }

    /// Open from a configured path string, where `:memory:` selects an
    /// in-memory database
    pub fn new(path: &str) -> DbResult<Self> {
        if path == MEMORY_PATH {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn wrap(conn: Connection, path: String) -> Self {
        log::debug!("Opened DuckDB database {path}");
        Self {
            conn: Mutex::new(conn),
            path,
        }
    }

    /// Path the backend was opened with (`:memory:` for in-memory databases)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Open a second connection to the same database instance.
    ///
    /// DuckDB refuses to open one file twice from the same process, so
    /// collaborators that need their own connection (the ledger) share the
    /// instance through this. In-memory databases are shared as well.
    pub fn try_clone_connection(&self) -> DbResult<Connection> {
        self.lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn run_script_sync(&self, sql: &str) -> DbResult<()> {
        self.lock()?.execute_batch(sql).map_err(DbError::from)
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let count: i64 = self
            .lock()?
            .query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| {
                row.get(0)
            })
            .map_err(DbError::from)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = name.rsplit_once('.').unwrap_or(("main", name));
        let count: i64 = self
            .lock()?
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(DbError::from)?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn run_script(&self, sql: &str) -> DbResult<()> {
        log::debug!("Running script ({} bytes) on {}", sql.len(), self.path);
        self.run_script_sync(sql)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
