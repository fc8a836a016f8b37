//! Audit rows for successfully applied alters.

use crate::report::{ReportLevel, Reporter};
use crate::targets::DbInstance;
use aa_db::{AuditEntry, DbResult, AUDIT_TABLE};

/// Writes one `applyalter_log` row per successful (alter, instance) pair.
///
/// The row goes over the instance's own connection so it is committed or
/// discarded together with the alter's statements.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    username: String,
}

impl AuditLogger {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Record that `alter_id` was applied to `instance` in `duration_ms`.
    ///
    /// Marks the instance used. A failed insert is reported and swallowed.
    pub async fn record(
        &self,
        instance: &mut DbInstance,
        alter_id: &str,
        duration_ms: u64,
        reporter: &dyn Reporter,
    ) {
        instance.mark_used();
        let entry = AuditEntry {
            username: &self.username,
            alter_id,
            duration_ms,
        };
        if let Err(e) = insert(instance, &entry).await {
            log::warn!(
                "Audit row for {} on {} not written: {}",
                alter_id,
                instance.id(),
                e
            );
            reporter.report(
                ReportLevel::Error,
                &format!("failed to insert {} record: {}", AUDIT_TABLE, e),
            );
        }
    }
}

async fn insert(instance: &DbInstance, entry: &AuditEntry<'_>) -> DbResult<()> {
    instance.connection()?.insert_audit(entry).await
}
