//! Decides whether an alter's effects already exist on an instance.

use crate::error::{ApplyError, ApplyResult};
use crate::report::{ReportLevel, Reporter};
use crate::targets::DbInstance;
use aa_core::{Alter, Check, CHECK_OK};
use aa_db::{CatalogProbe, DbError};

/// Whether `alter` was already applied to `instance`.
///
/// A `checkok` probe answering `OK` settles it on its own. Otherwise every
/// structured check must find its object; an alter without checks is never
/// considered applied. Only read-only queries are issued, and a query that
/// fails to run is an error rather than "not applied".
pub async fn already_applied(
    alter: &Alter,
    instance: &DbInstance,
    reporter: &dyn Reporter,
) -> ApplyResult<bool> {
    let check_error = |source: DbError| ApplyError::Check {
        alter: alter.id.to_string(),
        instance: instance.id().to_string(),
        source,
    };
    let db = instance.connection().map_err(check_error)?;

    if let Some(sql) = alter.checkok.as_deref().filter(|s| !s.trim().is_empty()) {
        reporter.report(ReportLevel::StatementStep, &format!("Check: {}", sql));
        let answer = db.query_first(sql).await.map_err(check_error)?;
        if answer.is_some_and(|a| a.eq_ignore_ascii_case(CHECK_OK)) {
            return Ok(true);
        }
    }

    if alter.checks.is_empty() {
        return Ok(false);
    }

    let default_schema = instance.current_schema().unwrap_or_default();
    for check in &alter.checks {
        let probe = catalog_probe(check, &default_schema);
        reporter.report(ReportLevel::StatementStep, &describe_probe(&probe));
        if !db.object_exists(&probe).await.map_err(check_error)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn catalog_probe(check: &Check, default_schema: &str) -> CatalogProbe {
    CatalogProbe {
        kind: check.kind,
        schema: check
            .schema
            .as_deref()
            .unwrap_or(default_schema)
            .to_uppercase(),
        table: check.table.as_ref().map(|t| t.to_uppercase()),
        name: check.name.to_uppercase(),
    }
}

fn describe_probe(probe: &CatalogProbe) -> String {
    format!("Check: {} ({})", probe.kind, probe.params().join(" "))
}

#[cfg(test)]
#[path = "checker_test.rs"]
mod tests;
