//! hop-db - Database abstraction layer for hop
//!
//! This crate provides the `Database` trait that script units are executed
//! through, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
