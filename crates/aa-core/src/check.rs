//! Structured idempotency checks.

use serde::Deserialize;
use std::fmt;

/// Expected result of a custom `checkok` probe.
pub const CHECK_OK: &str = "OK";

/// Kind of catalog object a [`Check`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Table,
    View,
    Column,
    Index,
    Sequence,
}

impl CheckKind {
    /// Whether the probe is qualified by a table name.
    pub fn requires_table(self) -> bool {
        matches!(self, CheckKind::Column | CheckKind::Index)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckKind::Table => "table",
            CheckKind::View => "view",
            CheckKind::Column => "column",
            CheckKind::Index => "index",
            CheckKind::Sequence => "sequence",
        };
        f.write_str(s)
    }
}

/// Probe for an object whose presence means the alter was already applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Check {
    pub kind: CheckKind,

    /// Owning table, required for column and index checks
    #[serde(default)]
    pub table: Option<String>,

    /// Object name
    pub name: String,

    /// Schema override; falls back to the alter schema
    #[serde(default)]
    pub schema: Option<String>,
}

impl Check {
    pub fn new(kind: CheckKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            table: None,
            name: name.into(),
            schema: None,
        }
    }

    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("{} check has an empty name", self.kind));
        }
        if self.kind.requires_table() && self.table.as_deref().map_or(true, |t| t.trim().is_empty())
        {
            return Err(format!(
                "{} check '{}' requires a table",
                self.kind, self.name
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        if let Some(table) = &self.table {
            write!(f, "{}.", table)?;
        }
        write!(f, "{}", self.name)
    }
}
