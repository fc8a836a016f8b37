//! Opening connections to configured instances

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use aa_core::{Engine, InstanceConfig};

/// Opens connections for instances.
///
/// The engine goes through this seam so tests can hand out in-memory doubles.
pub trait Connector: Send + Sync {
    fn connect(&self, instance: &InstanceConfig) -> DbResult<Box<dyn Database>>;
}

/// Dispatches on the instance's engine tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineConnector;

impl Connector for EngineConnector {
    fn connect(&self, instance: &InstanceConfig) -> DbResult<Box<dyn Database>> {
        match instance.engine {
            Engine::DuckDb => {
                let path = instance.path.as_deref().ok_or_else(|| {
                    DbError::ConnectionError(format!("instance {} has no path", instance.id))
                })?;
                log::debug!("Opening duckdb instance {} at {}", instance.id, path);
                Ok(Box::new(DuckDbBackend::new(path)?))
            }
            Engine::Postgres => Err(DbError::not_implemented("postgres", "connect")),
            Engine::MySql => Err(DbError::not_implemented("mysql", "connect")),
        }
    }
}
