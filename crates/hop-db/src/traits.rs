//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Target database that script units run against.
///
/// The engine only needs to run a script and learn whether it worked; the
/// introspection helpers exist for checks and tests.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a (possibly multi-statement) SQL script.
    async fn run_script(&self, sql: &str) -> DbResult<()>;

    /// Whether a table or view exists; `schema.name` or bare `name` (main).
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Number of rows `sql` returns.
    async fn query_count(&self, sql: &str) -> DbResult<usize>;
}
