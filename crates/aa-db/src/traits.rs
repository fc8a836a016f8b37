//! Database capability trait

use crate::error::DbResult;
use aa_core::{CheckKind, IsolationLevel};
use async_trait::async_trait;

/// Catalog lookup for an idempotency check.
///
/// Names are passed exactly as given; callers uppercase them and backends
/// compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProbe {
    pub kind: CheckKind,
    pub schema: String,
    pub table: Option<String>,
    pub name: String,
}

impl CatalogProbe {
    /// Bind parameters in placeholder order: schema, table (if any), name.
    pub fn params(&self) -> Vec<&str> {
        let mut params = vec![self.schema.as_str()];
        if let Some(table) = &self.table {
            params.push(table);
        }
        params.push(&self.name);
        params
    }
}

/// One row of the applied-alter audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry<'a> {
    pub username: &'a str,
    pub alter_id: &'a str,
    pub duration_ms: u64,
}

/// An open connection to one database instance.
///
/// All work happens inside an open transaction that only [`commit`] makes
/// durable; [`close`] discards anything not yet committed.
///
/// [`commit`]: Database::commit
/// [`close`]: Database::close
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of the first row as text
    async fn query_first(&self, sql: &str) -> DbResult<Option<String>>;

    /// Check whether a catalog object exists
    async fn object_exists(&self, probe: &CatalogProbe) -> DbResult<bool>;

    /// Invoke a migration procedure with integer arguments
    async fn call_procedure(&self, name: &str, args: &[i64]) -> DbResult<()>;

    /// Insert one audit row on this connection
    async fn insert_audit(&self, entry: &AuditEntry<'_>) -> DbResult<()>;

    /// Switch the current schema; engines without schemas ignore this
    async fn set_schema(&self, schema: &str) -> DbResult<()>;

    /// Set the transaction isolation level
    async fn set_isolation(&self, level: IsolationLevel) -> DbResult<()>;

    /// Commit pending work and start a new transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back pending work and release the connection
    async fn close(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
