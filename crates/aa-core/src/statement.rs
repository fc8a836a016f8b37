//! Alter statements: raw SQL, comments, and migration procedure calls.

use serde::Deserialize;
use std::fmt;

/// One executable unit of an alter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterStatement {
    /// Raw SQL sent to the instance as-is
    Sql { sql: String, can_fail: bool },
    /// No-op marker, reported but never dispatched
    Comment { text: String },
    /// Repeated invocation of a migration procedure over a set of ids
    MigrationProc(MigrationProc),
}

impl AlterStatement {
    /// Plain SQL statement that must not fail.
    pub fn sql(sql: impl Into<String>) -> Self {
        AlterStatement::Sql {
            sql: sql.into(),
            can_fail: false,
        }
    }

    /// Plain SQL statement whose errors are reported and ignored.
    pub fn tolerant_sql(sql: impl Into<String>) -> Self {
        AlterStatement::Sql {
            sql: sql.into(),
            can_fail: true,
        }
    }

    /// Whether execution errors of this statement are swallowed.
    pub fn can_fail(&self) -> bool {
        match self {
            AlterStatement::Sql { can_fail, .. } => *can_fail,
            AlterStatement::Comment { .. } => true,
            AlterStatement::MigrationProc(proc) => proc.can_fail,
        }
    }

    /// Whether the statement reaches the database at all.
    pub fn is_dispatched(&self) -> bool {
        !matches!(self, AlterStatement::Comment { .. })
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            AlterStatement::Sql { sql, .. } if sql.trim().is_empty() => {
                Err("statement has empty SQL".to_string())
            }
            AlterStatement::MigrationProc(proc) => proc.validate(),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for AlterStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterStatement::Sql { sql, can_fail } => {
                write!(f, "{}", sql.trim())?;
                if *can_fail {
                    write!(f, " (can fail)")?;
                }
                Ok(())
            }
            AlterStatement::Comment { text } => write!(f, "-- {}", text.trim()),
            AlterStatement::MigrationProc(proc) => write!(f, "{}", proc),
        }
    }
}

/// Migration procedure invoked once per id chunk or per listed id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationProc {
    /// Procedure (or DuckDB macro) name
    pub procedure: String,

    /// Ids to feed to the procedure
    pub ids: MigrationIds,

    #[serde(skip)]
    pub can_fail: bool,
}

impl MigrationProc {
    /// Argument lists for each invocation, in call order.
    pub fn invocations(&self) -> Vec<Vec<i64>> {
        match &self.ids {
            MigrationIds::Range { from, to, step } => {
                let step = (*step).max(1);
                let mut calls = Vec::new();
                let mut lo = *from;
                while lo <= *to {
                    let hi = lo.saturating_add(step - 1).min(*to);
                    calls.push(vec![lo, hi]);
                    match hi.checked_add(1) {
                        Some(next) => lo = next,
                        None => break,
                    }
                }
                calls
            }
            MigrationIds::List(ids) => ids.iter().map(|id| vec![*id]).collect(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.procedure.trim().is_empty() {
            return Err("migration procedure name is empty".to_string());
        }
        match &self.ids {
            MigrationIds::Range { step, .. } if *step < 1 => {
                Err(format!("migration id range step must be >= 1, got {}", step))
            }
            MigrationIds::Range { from, to, .. } if from > to => Err(format!(
                "migration id range is empty: from {} > to {}",
                from, to
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for MigrationProc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "migration {} ", self.procedure)?;
        match &self.ids {
            MigrationIds::Range { from, to, step } => {
                write!(f, "ids {}..={} step {}", from, to, step)?
            }
            MigrationIds::List(ids) => write!(f, "ids {:?}", ids)?,
        }
        if self.can_fail {
            write!(f, " (can fail)")?;
        }
        Ok(())
    }
}

/// Id selection for a [`MigrationProc`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MigrationIds {
    /// Inclusive range processed in chunks of `step`
    Range {
        from: i64,
        to: i64,
        #[serde(default = "default_step")]
        step: i64,
    },
    /// Explicit ids, one call each
    List(Vec<i64>),
}

fn default_step() -> i64 {
    1
}

/// Wire form of a statement inside an alter document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawStatement {
    Plain(String),
    Sql(RawSql),
    Comment(RawComment),
    Migration(RawMigration),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSql {
    sql: String,
    #[serde(default)]
    can_fail: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawComment {
    comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawMigration {
    migration: MigrationProc,
    #[serde(default)]
    can_fail: bool,
}

impl From<RawStatement> for AlterStatement {
    fn from(raw: RawStatement) -> Self {
        match raw {
            RawStatement::Plain(sql) => AlterStatement::sql(sql),
            RawStatement::Sql(RawSql { sql, can_fail }) => AlterStatement::Sql { sql, can_fail },
            RawStatement::Comment(RawComment { comment }) => {
                AlterStatement::Comment { text: comment }
            }
            RawStatement::Migration(RawMigration {
                mut migration,
                can_fail,
            }) => {
                migration.can_fail = can_fail;
                AlterStatement::MigrationProc(migration)
            }
        }
    }
}
