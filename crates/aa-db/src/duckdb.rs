//! DuckDB database backend implementation

use crate::engine::EngineDialect;
use crate::error::{DbError, DbResult};
use crate::traits::{AuditEntry, CatalogProbe, Database};
use aa_core::{Engine, IsolationLevel};
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
///
/// Opens an explicit transaction on connect so that statements only become
/// durable on [`Database::commit`].
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::begin(conn)
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", e, path.display())))?;
        Self::begin(conn)
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn begin(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        f(conn)
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<()> {
        log::debug!("duckdb: {}", sql);
        self.with_conn(|conn| {
            conn.execute_batch(sql)
                .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
        })
    }

    /// First value of the first row, rendered as text
    fn query_first_sync(&self, sql: &str, params: &[&str]) -> DbResult<Option<String>> {
        self.with_conn(|conn| {
            let query_err = |e: duckdb::Error| DbError::QueryError(format!("{}: {}", e, sql));
            let mut stmt = conn.prepare(sql).map_err(query_err)?;
            let mut rows = stmt
                .query(duckdb::params_from_iter(params.iter()))
                .map_err(query_err)?;
            let value: Option<Value> = match rows.next().map_err(query_err)? {
                Some(row) => Some(row.get(0).map_err(query_err)?),
                None => None,
            };
            Ok(value.and_then(value_to_text))
        })
    }

    fn row_exists_sync(&self, sql: &str, params: &[&str]) -> DbResult<bool> {
        self.with_conn(|conn| {
            let query_err = |e: duckdb::Error| DbError::QueryError(format!("{}: {}", e, sql));
            let mut stmt = conn.prepare(sql).map_err(query_err)?;
            let mut rows = stmt
                .query(duckdb::params_from_iter(params.iter()))
                .map_err(query_err)?;
            let found = rows.next().map_err(query_err)?.is_some();
            Ok(found)
        })
    }
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s),
        Value::Boolean(b) => Some(b.to_string()),
        Value::TinyInt(n) => Some(n.to_string()),
        Value::SmallInt(n) => Some(n.to_string()),
        Value::Int(n) => Some(n.to_string()),
        Value::BigInt(n) => Some(n.to_string()),
        other => Some(format!("{:?}", other)),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.execute_sync(sql)
    }

    async fn query_first(&self, sql: &str) -> DbResult<Option<String>> {
        self.query_first_sync(sql, &[])
    }

    async fn object_exists(&self, probe: &CatalogProbe) -> DbResult<bool> {
        let sql = Engine::DuckDb
            .catalog_probe_sql(probe.kind)
            .ok_or_else(|| DbError::not_implemented("duckdb", &format!("{} check", probe.kind)))?;
        self.row_exists_sync(sql, &probe.params())
    }

    async fn call_procedure(&self, name: &str, args: &[i64]) -> DbResult<()> {
        self.execute_sync(&Engine::DuckDb.procedure_call_sql(name, args))
    }

    async fn insert_audit(&self, entry: &AuditEntry<'_>) -> DbResult<()> {
        let sql = Engine::DuckDb.audit_insert_sql();
        self.with_conn(|conn| {
            conn.execute(
                &sql,
                duckdb::params![entry.username, entry.alter_id, entry.duration_ms as i64],
            )
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;
            Ok(())
        })
    }

    async fn set_schema(&self, schema: &str) -> DbResult<()> {
        match Engine::DuckDb.set_schema_sql(schema) {
            Some(sql) => self.execute_sync(&sql),
            None => Ok(()),
        }
    }

    async fn set_isolation(&self, level: IsolationLevel) -> DbResult<()> {
        match Engine::DuckDb.isolation_sql(level) {
            Some(sql) => self.execute_sync(&sql),
            None => {
                log::debug!("duckdb: ignoring isolation level {}", level);
                Ok(())
            }
        }
    }

    async fn commit(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch("COMMIT")
                .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {}", e)))?;
            conn.execute_batch("BEGIN TRANSACTION")
                .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {}", e)))
        })
    }

    async fn close(&self) -> DbResult<()> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            // Anything not committed is discarded
            if let Err(e) = conn.execute_batch("ROLLBACK") {
                log::debug!("duckdb: rollback on close failed: {}", e);
            }
        }
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
