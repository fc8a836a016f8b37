//! Configured database instances and their per-batch connection state.

use crate::error::{ApplyError, ApplyResult};
use crate::failures::Failures;
use crate::report::{ReportLevel, Reporter};
use aa_core::{Alter, InstanceConfig, InstanceId, InstanceType, InstancesConfig, IsolationLevel};
use aa_db::{Connector, Database, DbError, DbResult, EngineDialect};
use std::collections::BTreeSet;

/// One target instance.
///
/// The connection is opened on first use and kept for the whole batch. `used`
/// turns on once anything was dispatched over it and stays on until the
/// instance is dropped.
pub struct DbInstance {
    config: InstanceConfig,
    connection: Option<Box<dyn Database>>,
    used: bool,
    schema: Option<String>,
}

impl std::fmt::Debug for DbInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbInstance")
            .field("id", &self.config.id)
            .field("type", &self.config.instance_type)
            .field("connected", &self.connection.is_some())
            .field("used", &self.used)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl DbInstance {
    pub fn new(config: InstanceConfig) -> Self {
        Self {
            config,
            connection: None,
            used: false,
            schema: None,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.config.id
    }

    pub fn instance_type(&self) -> &InstanceType {
        &self.config.instance_type
    }

    /// Connection URL for reports
    pub fn url(&self) -> String {
        self.config.engine.url(&self.config)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Schema last set by an alter, else the configured or engine default.
    pub fn current_schema(&self) -> Option<String> {
        self.schema
            .clone()
            .or_else(|| self.config.engine.default_schema(&self.config))
    }

    /// Open the connection unless it is already open.
    pub fn connect(&mut self, connector: &dyn Connector) -> DbResult<()> {
        if self.connection.is_none() {
            log::debug!("Connecting to {} ({})", self.config.id, self.url());
            self.connection = Some(connector.connect(&self.config)?);
        }
        Ok(())
    }

    /// The open connection.
    pub fn connection(&self) -> DbResult<&dyn Database> {
        self.connection.as_deref().ok_or(DbError::Closed)
    }

    pub async fn set_schema(&mut self, schema: &str) -> DbResult<()> {
        self.connection()?.set_schema(schema).await?;
        self.schema = Some(schema.to_string());
        Ok(())
    }

    pub async fn set_isolation(&self, level: IsolationLevel) -> DbResult<()> {
        self.connection()?.set_isolation(level).await
    }

    /// Record that work was dispatched over this instance's connection.
    pub fn mark_used(&mut self) {
        self.used = true;
    }

    pub async fn commit(&self) -> DbResult<()> {
        self.connection()?.commit().await
    }

    /// Release the connection, discarding uncommitted work.
    pub async fn close(&mut self) {
        if let Some(db) = self.connection.take() {
            log::debug!("Closing connection to {}", self.config.id);
            if let Err(e) = db.close().await {
                log::warn!("Failed to close connection to {}: {}", self.config.id, e);
            }
        }
    }
}

/// All configured instances plus the ignore-failures policy flag.
#[derive(Debug)]
pub struct TargetSet {
    instances: Vec<DbInstance>,
    ignore_failures: bool,
}

impl TargetSet {
    /// Build the target set. Instance ids are unique in a validated config.
    pub fn new(config: InstancesConfig) -> Self {
        Self {
            instances: config.instances.into_iter().map(DbInstance::new).collect(),
            ignore_failures: config.ignore_failures,
        }
    }

    pub fn ignore_failures(&self) -> bool {
        self.ignore_failures
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[DbInstance] {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut [DbInstance] {
        &mut self.instances
    }

    pub fn get(&self, id: &str) -> Option<&DbInstance> {
        self.instances.iter().find(|i| i.id() == id)
    }

    /// Instance-type tags known to this set.
    pub fn known_types(&self) -> BTreeSet<&str> {
        self.instances.iter().map(|i| i.instance_type().as_str()).collect()
    }

    /// Fail if any alter targets an instance type that no instance has.
    pub fn check_instance_types(&self, alters: &[Alter]) -> ApplyResult<()> {
        let known = self.known_types();
        for alter in alters {
            for instance_type in &alter.instances {
                if !known.contains(instance_type.as_str()) {
                    return Err(ApplyError::UnknownInstanceType {
                        alter: alter.id.to_string(),
                        instance_type: instance_type.to_string(),
                        known: known.iter().copied().collect::<Vec<_>>().join(", "),
                    });
                }
            }
        }
        Ok(())
    }

    /// Commit every used instance, handing commit errors to `failures`.
    pub async fn commit_used(
        &self,
        failures: &mut Failures,
        reporter: &dyn Reporter,
    ) -> ApplyResult<()> {
        for instance in self.instances.iter().filter(|i| i.is_used()) {
            reporter.report(ReportLevel::Detail, &format!("Committing {}", instance.id()));
            if let Err(e) = instance.commit().await {
                failures.add_or_abort(ApplyError::Commit {
                    instance: instance.id().to_string(),
                    source: e,
                })?;
            }
        }
        Ok(())
    }

    /// Close every connection.
    pub async fn close_all(&mut self) {
        for instance in &mut self.instances {
            instance.close().await;
        }
    }
}
