//! aa-db - Database abstraction layer for applyalter
//!
//! This crate provides the `Database` capability trait every engine must
//! satisfy, the per-engine SQL dialect, and the DuckDB implementation.
//! PostgreSQL and MySQL contribute their dialect but cannot connect yet.

pub mod connector;
pub mod duckdb;
pub mod engine;
pub mod error;
pub mod traits;

pub use connector::{Connector, EngineConnector};
pub use crate::duckdb::DuckDbBackend;
pub use engine::{EngineDialect, AUDIT_TABLE};
pub use error::{DbError, DbResult};
pub use traits::{AuditEntry, CatalogProbe, Database};
