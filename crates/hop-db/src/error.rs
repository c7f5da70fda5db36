//! Error types for hop-db

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: The database could not be opened
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// D002: A script (or one of its statements) was rejected
    #[error("[D002] Script failed: {0}")]
    ScriptFailed(String),

    /// D003: A script referenced a table or view that does not exist
    #[error("[D003] Relation not found: {0}")]
    RelationNotFound(String),

    /// D004: A previous holder of the connection panicked
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured catalog variants; only the
        // message can tell a missing relation apart.
        let msg = err.to_string();
        let missing_relation = msg.contains("Catalog Error")
            && (msg.contains("Table with name")
                || msg.contains("View with name")
                || msg.contains("Table or view with name"));
        if missing_relation {
            DbError::RelationNotFound(msg)
        } else {
            DbError::ScriptFailed(msg)
        }
    }
}
