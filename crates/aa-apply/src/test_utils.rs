//! In-memory fleet for exercising the engine without real databases.
//!
//! [`FakeFleet`] hands out connections that record every call in a shared
//! journal and fail on demand. Uncommitted work is tracked per instance so
//! tests can tell what a commit made durable and what a close threw away.

use crate::report::{ReportLevel, Reporter};
use aa_core::{InstanceConfig, IsolationLevel};
use aa_db::{AuditEntry, CatalogProbe, Connector, Database, DbError, DbResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// One call made against a fake connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect(String),
    Execute { instance: String, sql: String },
    Query { instance: String, sql: String },
    Probe { instance: String, probe: CatalogProbe },
    Procedure { instance: String, name: String, args: Vec<i64> },
    Audit { instance: String, alter_id: String },
    SetSchema { instance: String, schema: String },
    SetIsolation { instance: String, level: IsolationLevel },
    Commit(String),
    Close(String),
}

#[derive(Debug, Default)]
struct FleetState {
    events: Vec<Event>,
    failing_sql: HashMap<String, Vec<String>>,
    checkok_answers: HashMap<String, String>,
    existing_objects: HashMap<String, HashSet<String>>,
    failing_connects: HashSet<String>,
    failing_commits: HashSet<String>,
    failing_audits: HashSet<String>,
    failing_probes: HashSet<String>,
    pending_audits: HashMap<String, Vec<String>>,
    committed_audits: HashMap<String, Vec<String>>,
}

/// Connector producing recording fake connections.
#[derive(Debug, Clone, Default)]
pub struct FakeFleet {
    state: Arc<Mutex<FleetState>>,
}

impl FakeFleet {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FleetState> {
        self.state.lock().unwrap()
    }

    /// Statements on `instance` containing `fragment` fail.
    pub fn fail_sql(&self, instance: &str, fragment: &str) -> &Self {
        self.state()
            .failing_sql
            .entry(instance.to_string())
            .or_default()
            .push(fragment.to_string());
        self
    }

    /// `checkok` probes on `instance` answer `answer`.
    pub fn answer_checkok(&self, instance: &str, answer: &str) -> &Self {
        self.state()
            .checkok_answers
            .insert(instance.to_string(), answer.to_string());
        self
    }

    /// Catalog probes on `instance` for `name` (any case) find an object.
    pub fn with_object(&self, instance: &str, name: &str) -> &Self {
        self.state()
            .existing_objects
            .entry(instance.to_string())
            .or_default()
            .insert(name.to_uppercase());
        self
    }

    pub fn fail_connect(&self, instance: &str) -> &Self {
        self.state().failing_connects.insert(instance.to_string());
        self
    }

    pub fn fail_commit(&self, instance: &str) -> &Self {
        self.state().failing_commits.insert(instance.to_string());
        self
    }

    pub fn fail_audit(&self, instance: &str) -> &Self {
        self.state().failing_audits.insert(instance.to_string());
        self
    }

    pub fn fail_probe(&self, instance: &str) -> &Self {
        self.state().failing_probes.insert(instance.to_string());
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// SQL dispatched to `instance`, in order.
    pub fn executed(&self, instance: &str) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Execute { instance: i, sql } if i == instance => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self, instance: &str) -> usize {
        self.state()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Commit(i) if i == instance))
            .count()
    }

    pub fn connects(&self, instance: &str) -> usize {
        self.state()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Connect(i) if i == instance))
            .count()
    }

    pub fn closes(&self, instance: &str) -> usize {
        self.state()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Close(i) if i == instance))
            .count()
    }

    /// Audit rows made durable by a commit on `instance`.
    pub fn committed_audits(&self, instance: &str) -> Vec<String> {
        self.state()
            .committed_audits
            .get(instance)
            .cloned()
            .unwrap_or_default()
    }

    /// Any call other than connect, set-schema, set-isolation, probes and close.
    pub fn dispatched_anything(&self, instance: &str) -> bool {
        self.state().events.iter().any(|e| match e {
            Event::Execute { instance: i, .. }
            | Event::Procedure { instance: i, .. }
            | Event::Audit { instance: i, .. } => i == instance,
            Event::Commit(i) => i == instance,
            _ => false,
        })
    }
}

impl Connector for FakeFleet {
    fn connect(&self, instance: &InstanceConfig) -> DbResult<Box<dyn Database>> {
        let id = instance.id.to_string();
        let mut state = self.state();
        state.events.push(Event::Connect(id.clone()));
        if state.failing_connects.contains(&id) {
            return Err(DbError::ConnectionError(format!("{} unreachable", id)));
        }
        Ok(Box::new(FakeDatabase {
            instance: id,
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeDatabase {
    instance: String,
    state: Arc<Mutex<FleetState>>,
}

impl FakeDatabase {
    fn state(&self) -> MutexGuard<'_, FleetState> {
        self.state.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Database for FakeDatabase {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        let mut state = self.state();
        state.events.push(Event::Execute {
            instance: self.instance.clone(),
            sql: sql.to_string(),
        });
        let fails = state
            .failing_sql
            .get(&self.instance)
            .is_some_and(|fragments| fragments.iter().any(|f| sql.contains(f.as_str())));
        if fails {
            return Err(DbError::ExecutionError(format!("rejected: {}", sql)));
        }
        Ok(())
    }

    async fn query_first(&self, sql: &str) -> DbResult<Option<String>> {
        let mut state = self.state();
        state.events.push(Event::Query {
            instance: self.instance.clone(),
            sql: sql.to_string(),
        });
        if state.failing_probes.contains(&self.instance) {
            return Err(DbError::QueryError(format!("probe failed: {}", sql)));
        }
        Ok(state.checkok_answers.get(&self.instance).cloned())
    }

    async fn object_exists(&self, probe: &CatalogProbe) -> DbResult<bool> {
        let mut state = self.state();
        state.events.push(Event::Probe {
            instance: self.instance.clone(),
            probe: probe.clone(),
        });
        if state.failing_probes.contains(&self.instance) {
            return Err(DbError::QueryError("catalog unavailable".to_string()));
        }
        Ok(state
            .existing_objects
            .get(&self.instance)
            .is_some_and(|objects| objects.contains(&probe.name)))
    }

    async fn call_procedure(&self, name: &str, args: &[i64]) -> DbResult<()> {
        let mut state = self.state();
        state.events.push(Event::Procedure {
            instance: self.instance.clone(),
            name: name.to_string(),
            args: args.to_vec(),
        });
        let fails = state
            .failing_sql
            .get(&self.instance)
            .is_some_and(|fragments| fragments.iter().any(|f| name.contains(f.as_str())));
        if fails {
            return Err(DbError::ExecutionError(format!("procedure {} failed", name)));
        }
        Ok(())
    }

    async fn insert_audit(&self, entry: &AuditEntry<'_>) -> DbResult<()> {
        let mut state = self.state();
        state.events.push(Event::Audit {
            instance: self.instance.clone(),
            alter_id: entry.alter_id.to_string(),
        });
        if state.failing_audits.contains(&self.instance) {
            return Err(DbError::ExecutionError("audit table missing".to_string()));
        }
        state
            .pending_audits
            .entry(self.instance.clone())
            .or_default()
            .push(entry.alter_id.to_string());
        Ok(())
    }

    async fn set_schema(&self, schema: &str) -> DbResult<()> {
        self.state().events.push(Event::SetSchema {
            instance: self.instance.clone(),
            schema: schema.to_string(),
        });
        Ok(())
    }

    async fn set_isolation(&self, level: IsolationLevel) -> DbResult<()> {
        self.state().events.push(Event::SetIsolation {
            instance: self.instance.clone(),
            level,
        });
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        let mut state = self.state();
        state.events.push(Event::Commit(self.instance.clone()));
        if state.failing_commits.contains(&self.instance) {
            return Err(DbError::TransactionError("commit rejected".to_string()));
        }
        let pending = state
            .pending_audits
            .remove(&self.instance)
            .unwrap_or_default();
        state
            .committed_audits
            .entry(self.instance.clone())
            .or_default()
            .extend(pending);
        Ok(())
    }

    async fn close(&self) -> DbResult<()> {
        let mut state = self.state();
        state.events.push(Event::Close(self.instance.clone()));
        state.pending_audits.remove(&self.instance);
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }
}

/// Reporter that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(ReportLevel, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported at `level`, in order.
    pub fn at(&self, level: ReportLevel) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, level: ReportLevel, fragment: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(fragment))
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// Fleet configuration of DuckDB-tagged instances `(id, type)` for the fake connector.
pub fn fleet_config(instances: &[(&str, &str)], ignore_failures: bool) -> aa_core::InstancesConfig {
    let instances = instances
        .iter()
        .map(|(id, instance_type)| InstanceConfig::duckdb(id, instance_type, ":memory:"))
        .collect();
    aa_core::InstancesConfig::new(instances, ignore_failures).unwrap()
}
