//! Alter scripts: ordered statements plus applicability and idempotency metadata.

use crate::check::Check;
use crate::error::{CoreError, CoreResult};
use crate::names::{AlterId, InstanceType};
use crate::run_mode::IsolationLevel;
use crate::statement::{AlterStatement, RawStatement};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// One migration script.
///
/// Built once from its serialized form and never mutated while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alter {
    /// File or archive-entry name the alter was loaded from
    pub id: AlterId,

    /// Instance types this alter applies to; empty means every instance
    pub instances: BTreeSet<InstanceType>,

    /// Statements in execution order
    pub statements: Vec<AlterStatement>,

    /// Schema to switch to before running the statements
    pub schema: Option<String>,

    /// Isolation level to set before running the statements
    pub isolation: Option<IsolationLevel>,

    /// Structured checks; all must hold for the alter to count as applied
    pub checks: Vec<Check>,

    /// Custom probe; a single `OK` result alone means applied
    pub checkok: Option<String>,
}

/// Serialized alter document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AlterFile {
    #[serde(default)]
    instances: BTreeSet<InstanceType>,

    #[serde(default)]
    schema: Option<String>,

    #[serde(default)]
    isolation: Option<IsolationLevel>,

    #[serde(default)]
    checkok: Option<String>,

    #[serde(default)]
    checks: Vec<Check>,

    #[serde(default)]
    statements: Vec<RawStatement>,
}

impl Alter {
    /// Create an alter that applies to every instance.
    pub fn new(id: AlterId, statements: Vec<AlterStatement>) -> Self {
        Self {
            id,
            instances: BTreeSet::new(),
            statements,
            schema: None,
            isolation: None,
            checks: Vec::new(),
            checkok: None,
        }
    }

    /// Restrict the alter to the given instance types.
    pub fn for_instances<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances = types.into_iter().map(InstanceType::new).collect();
        self
    }

    /// Decode an alter document.
    ///
    /// `source_name` may be a path or archive-entry name; only its final
    /// component becomes the alter id.
    pub fn from_yaml(source_name: &str, content: &str) -> CoreResult<Self> {
        let id = alter_id_from_name(source_name)?;
        let file: AlterFile =
            serde_yaml::from_str(content).map_err(|e| CoreError::AlterParseError {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        let alter = Alter {
            id,
            instances: file.instances,
            statements: file.statements.into_iter().map(AlterStatement::from).collect(),
            schema: file.schema.filter(|s| !s.trim().is_empty()),
            isolation: file.isolation,
            checks: file.checks,
            checkok: file.checkok.filter(|s| !s.trim().is_empty()),
        };
        alter.validate()?;
        Ok(alter)
    }

    /// Apply this alter to all instances?
    pub fn is_all_instances(&self) -> bool {
        self.instances.is_empty()
    }

    /// Whether an instance of type `instance_type` is a target of this alter.
    pub fn applies_to(&self, instance_type: &str) -> bool {
        self.is_all_instances() || self.instances.contains(instance_type)
    }

    fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| CoreError::AlterInvalid {
            id: self.id.to_string(),
            reason,
        };
        for check in &self.checks {
            check.validate().map_err(invalid)?;
        }
        for (i, statement) in self.statements.iter().enumerate() {
            statement
                .validate()
                .map_err(|reason| invalid(format!("statement {}: {}", i + 1, reason)))?;
        }
        Ok(())
    }
}

fn alter_id_from_name(source_name: &str) -> CoreResult<AlterId> {
    let file_name = Path::new(source_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(source_name);
    AlterId::try_new(file_name).ok_or_else(|| CoreError::AlterInvalid {
        id: source_name.to_string(),
        reason: "alter id must not be blank".to_string(),
    })
}

#[cfg(test)]
#[path = "alter_test.rs"]
mod tests;
