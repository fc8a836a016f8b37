//! Database instance configuration (`dbconfig.yml`)

use crate::error::{CoreError, CoreResult};
use crate::names::{InstanceId, InstanceType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Fleet configuration: the instances alters are applied to.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstancesConfig {
    /// Collect failures and report them at the end instead of stopping at the first one
    #[serde(default)]
    pub ignore_failures: bool,

    /// Instances in application order
    pub instances: Vec<InstanceConfig>,
}

/// Database engine of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    DuckDb,
    Postgres,
    MySql,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::DuckDb => write!(f, "duckdb"),
            Engine::Postgres => write!(f, "postgres"),
            Engine::MySql => write!(f, "mysql"),
        }
    }
}

/// One configured database instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub id: InstanceId,

    /// Instance-type tag matched against alter `instances`
    #[serde(rename = "type")]
    pub instance_type: InstanceType,

    pub engine: Engine,

    /// Database file for DuckDB (or `:memory:`)
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Database name for network engines
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Schema used by checks when neither the check nor the alter names one
    #[serde(default)]
    pub schema: Option<String>,
}

impl InstanceConfig {
    /// DuckDB instance backed by `path`.
    pub fn duckdb(id: &str, instance_type: &str, path: impl Into<String>) -> Self {
        Self {
            id: InstanceId::new(id),
            instance_type: InstanceType::new(instance_type),
            engine: Engine::DuckDb,
            path: Some(path.into()),
            host: None,
            port: None,
            database: None,
            user: None,
            password: None,
            schema: None,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| CoreError::ConfigInvalid { message };
        match self.engine {
            Engine::DuckDb if self.path.as_deref().map_or(true, |p| p.trim().is_empty()) => Err(
                invalid(format!("duckdb instance '{}' requires a path", self.id)),
            ),
            Engine::Postgres | Engine::MySql
                if self.database.as_deref().map_or(true, |d| d.trim().is_empty()) =>
            {
                Err(invalid(format!(
                    "{} instance '{}' requires a database",
                    self.engine, self.id
                )))
            }
            _ => Ok(()),
        }
    }
}

impl InstancesConfig {
    /// Load and validate the configuration from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: InstancesConfig =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from already-constructed instances.
    pub fn new(instances: Vec<InstanceConfig>, ignore_failures: bool) -> CoreResult<Self> {
        let config = Self {
            ignore_failures,
            instances,
        };
        config.validate()?;
        Ok(config)
    }

    /// All instance-type tags present in the fleet.
    pub fn instance_types(&self) -> BTreeSet<&InstanceType> {
        self.instances.iter().map(|i| &i.instance_type).collect()
    }

    fn validate(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for instance in &self.instances {
            if !seen.insert(instance.id.as_str()) {
                return Err(CoreError::DuplicateInstance {
                    id: instance.id.to_string(),
                });
            }
            instance.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
