//! aa-apply - Alter application engine for applyalter
//!
//! This crate runs alters against the target set: it decides per instance
//! whether an alter is already applied, dispatches its statements, writes the
//! audit row, commits, and aggregates failures under the configured policy.

pub mod applier;
pub mod audit;
pub mod checker;
pub mod error;
pub mod failures;
pub mod report;
pub mod targets;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use applier::{AlterApplier, ApplyOptions};
pub use audit::AuditLogger;
pub use checker::already_applied;
pub use error::{ApplyError, ApplyResult};
pub use failures::{FailurePolicy, Failures};
pub use report::{LogReporter, ReportLevel, Reporter};
pub use targets::{DbInstance, TargetSet};
