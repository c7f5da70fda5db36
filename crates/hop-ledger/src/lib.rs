//! hop-ledger - Applied-unit ledger for hop
//!
//! A ledger answers one question: has this named unit already been applied?
//! Two stores implement the [`Ledger`] trait: a DuckDB table living next to
//! the data it guards (bootstrap units) and a JSON file inside the
//! repository (migration steps).

pub mod duckdb_ledger;
pub mod error;
pub mod file;
pub mod record;
pub mod schema;

pub use duckdb_ledger::DuckDbLedger;
pub use error::{LedgerError, LedgerResult};
pub use file::FileLedger;
pub use record::{Ledger, LedgerRecord};
