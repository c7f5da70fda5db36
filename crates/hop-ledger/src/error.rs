//! Error types for the ledger.

use thiserror::Error;

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open or create the ledger database (L001).
    #[error("[L001] Ledger connection failed: {0}")]
    ConnectionError(String),

    /// Ledger table could not be created or has an unsupported layout (L002).
    #[error("[L002] Ledger schema error: {0}")]
    SchemaError(String),

    /// A key was recorded twice (L003).
    #[error("[L003] Ledger already has a record for '{key}'")]
    DuplicateRecord { key: String },

    /// SQL execution error inside the ledger table (L004).
    #[error("[L004] Ledger query failed: {0}")]
    QueryError(String),

    /// Transaction management error (L005).
    #[error("[L005] Ledger transaction failed: {0}")]
    TransactionError(String),

    /// Persisted ledger content could not be understood (L006).
    #[error("[L006] Corrupt ledger {location}: {reason}")]
    Corrupt { location: String, reason: String },

    /// File-backed ledger IO failure (L007).
    #[error("[L007] Ledger file error: {0}")]
    Core(#[from] hop_core::CoreError),

    /// DuckDB driver error with preserved source chain (L008).
    #[error("[L008] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<duckdb::Error> for LedgerError {
    fn from(err: duckdb::Error) -> Self {
        LedgerError::DuckDb(err)
    }
}
