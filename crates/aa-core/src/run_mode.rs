//! Run modes and transaction isolation hints.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Batch-wide switch between a dry run and real execution.
///
/// The engine never matches on the variant directly; it asks the gate methods
/// below, so a new mode only has to answer those three questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Show statements, execute nothing
    Print,
    /// Execute statements and commit
    #[default]
    Sharp,
}

impl RunMode {
    /// Whether statements are dispatched to the database.
    pub fn dispatches_statements(self) -> bool {
        matches!(self, RunMode::Sharp)
    }

    /// Whether used connections are committed after each alter.
    pub fn commits(self) -> bool {
        matches!(self, RunMode::Sharp)
    }

    /// Whether successful alters are recorded in the audit table.
    pub fn writes_audit(self) -> bool {
        matches!(self, RunMode::Sharp)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Print => write!(f, "print"),
            RunMode::Sharp => write!(f, "sharp"),
        }
    }
}

impl FromStr for RunMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Ok(RunMode::Print),
            "sharp" => Ok(RunMode::Sharp),
            _ => Err(CoreError::UnknownRunMode {
                name: s.to_string(),
            }),
        }
    }
}

/// Transaction isolation hint carried by an alter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// SQL keyword form, e.g. `READ COMMITTED`
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
