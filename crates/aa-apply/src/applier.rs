//! Applies a batch of alters across the target set.
//!
//! Alters run in the given order. For each alter every matching instance is
//! visited in configuration order: connect (once per batch), set schema and
//! isolation, check whether the alter is already there, run the statements,
//! then write the audit row. After each alter the used instances are
//! committed, unless a failure has been recorded. All connections are closed
//! when the batch ends, whatever the outcome.

use crate::audit::AuditLogger;
use crate::checker::already_applied;
use crate::error::{ApplyError, ApplyResult};
use crate::failures::{FailurePolicy, Failures};
use crate::report::{ReportLevel, Reporter};
use crate::targets::{DbInstance, TargetSet};
use aa_core::{Alter, AlterStatement, RunMode};
use aa_db::{Connector, DbResult};
use std::time::Instant;

/// Settings fixed for one `apply` call.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub run_mode: RunMode,
    /// Recorded in every audit row
    pub username: String,
}

impl ApplyOptions {
    pub fn new(run_mode: RunMode, username: impl Into<String>) -> Self {
        Self {
            run_mode,
            username: username.into(),
        }
    }
}

/// Batch driver. Owns nothing but borrows the targets for the whole batch.
pub struct AlterApplier<'a> {
    targets: &'a mut TargetSet,
    ctx: ApplyContext<'a>,
}

/// Everything the per-instance work needs besides the instance itself.
struct ApplyContext<'a> {
    connector: &'a dyn Connector,
    reporter: &'a dyn Reporter,
    run_mode: RunMode,
    audit: AuditLogger,
}

impl<'a> AlterApplier<'a> {
    pub fn new(
        targets: &'a mut TargetSet,
        connector: &'a dyn Connector,
        reporter: &'a dyn Reporter,
        options: ApplyOptions,
    ) -> Self {
        Self {
            targets,
            ctx: ApplyContext {
                connector,
                reporter,
                run_mode: options.run_mode,
                audit: AuditLogger::new(options.username),
            },
        }
    }

    /// Apply `alters` in order.
    ///
    /// Under the fail-fast policy the first failure is returned as is. When
    /// failures are collected they come back together as
    /// [`ApplyError::Aggregate`] once every alter has been attempted.
    pub async fn apply(&mut self, alters: &[Alter]) -> ApplyResult<()> {
        let policy = FailurePolicy::from_ignore_failures(self.targets.ignore_failures());
        let mut failures = Failures::new(policy);

        let result = self.apply_alters(alters, &mut failures).await;
        self.targets.close_all().await;
        result?;

        if !failures.is_empty() {
            self.ctx.reporter.report(
                ReportLevel::Main,
                &format!("{} failure(s) recorded", failures.len()),
            );
        }
        failures.into_result()
    }

    async fn apply_alters(&mut self, alters: &[Alter], failures: &mut Failures) -> ApplyResult<()> {
        self.ctx.reporter.report(
            ReportLevel::Main,
            &format!(
                "Executing {} alterscripts on {} database instances ({} mode)",
                alters.len(),
                self.targets.len(),
                self.ctx.run_mode
            ),
        );
        self.targets.check_instance_types(alters)?;

        for alter in alters {
            self.ctx
                .reporter
                .report(ReportLevel::Alter, &format!("alterscript: {}", alter.id));

            for instance in self
                .targets
                .instances_mut()
                .iter_mut()
                .filter(|i| alter.applies_to(i.instance_type().as_str()))
            {
                if let Err(e) = self.ctx.apply_to_instance(alter, instance).await {
                    log::debug!("Alter {} failed on {}: {}", alter.id, instance.id(), e);
                    failures.add_or_abort(e)?;
                }
            }

            if !self.ctx.run_mode.commits() {
                continue;
            }
            if failures.is_empty() {
                self.targets.commit_used(failures, self.ctx.reporter).await?;
            } else {
                self.ctx.reporter.report(
                    ReportLevel::Detail,
                    &format!("Skipping commit of {}: failures recorded", alter.id),
                );
            }
        }
        Ok(())
    }
}

impl ApplyContext<'_> {
    async fn apply_to_instance(&self, alter: &Alter, instance: &mut DbInstance) -> ApplyResult<()> {
        let started = Instant::now();

        instance
            .connect(self.connector)
            .map_err(|source| ApplyError::Connect {
                instance: instance.id().to_string(),
                source,
            })?;
        self.prepare(alter, instance)
            .await
            .map_err(|source| ApplyError::Prepare {
                alter: alter.id.to_string(),
                instance: instance.id().to_string(),
                source,
            })?;
        self.reporter.report(
            ReportLevel::Detail,
            &format!(
                "Database instance {} {}, schema {}",
                instance.id(),
                instance.url(),
                instance.current_schema().unwrap_or_default()
            ),
        );

        if already_applied(alter, instance, self.reporter).await? {
            self.reporter
                .report(ReportLevel::Alter, "Alter already applied, skipping");
            return Ok(());
        }

        for statement in &alter.statements {
            self.run_statement(alter, instance, statement).await?;
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.reporter.report(
            ReportLevel::Alter,
            &format!("Alter {} on {} took {} ms", alter.id, instance.id(), duration_ms),
        );
        if self.run_mode.writes_audit() {
            self.audit
                .record(instance, alter.id.as_str(), duration_ms, self.reporter)
                .await;
        }
        Ok(())
    }

    async fn prepare(&self, alter: &Alter, instance: &mut DbInstance) -> DbResult<()> {
        if let Some(schema) = &alter.schema {
            instance.set_schema(schema).await?;
        }
        if let Some(level) = alter.isolation {
            instance.set_isolation(level).await?;
        }
        Ok(())
    }

    async fn run_statement(
        &self,
        alter: &Alter,
        instance: &mut DbInstance,
        statement: &AlterStatement,
    ) -> ApplyResult<()> {
        self.reporter
            .report(ReportLevel::Statement, &statement.to_string());
        if !statement.is_dispatched() || !self.run_mode.dispatches_statements() {
            return Ok(());
        }

        instance.mark_used();
        match self.dispatch(instance, statement).await {
            Ok(()) => Ok(()),
            Err(e) if statement.can_fail() => {
                log::warn!("Ignoring failure on {}: {}", instance.id(), e);
                self.reporter
                    .report(ReportLevel::Error, &format!("statement failed, ignoring: {}", e));
                Ok(())
            }
            Err(source) => Err(ApplyError::Statement {
                alter: alter.id.to_string(),
                instance: instance.id().to_string(),
                statement: statement.to_string(),
                source,
            }),
        }
    }

    async fn dispatch(&self, instance: &DbInstance, statement: &AlterStatement) -> DbResult<()> {
        let db = instance.connection()?;
        match statement {
            AlterStatement::Sql { sql, .. } => {
                log::debug!("Executing on {}: {}", instance.id(), sql);
                db.execute(sql).await
            }
            AlterStatement::MigrationProc(proc) => {
                for args in proc.invocations() {
                    self.reporter.report(
                        ReportLevel::StatementStep,
                        &format!("{}({})", proc.procedure, join_args(&args)),
                    );
                    db.call_procedure(&proc.procedure, &args).await?;
                }
                Ok(())
            }
            AlterStatement::Comment { .. } => Ok(()),
        }
    }
}

fn join_args(args: &[i64]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
