//! Progress reporting.
//!
//! The engine describes what it does through a [`Reporter`]; how messages are
//! rendered is up to the caller.

use std::fmt;

/// Granularity of a progress message, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportLevel {
    /// Batch start and summary
    Main,
    /// One alter (or one alter on one instance)
    Alter,
    /// Instance details: URL, schema, commits
    Detail,
    /// Each statement
    Statement,
    /// Checks run before the statements
    StatementStep,
    /// Errors that were reported and swallowed
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportLevel::Main => "main",
            ReportLevel::Alter => "alter",
            ReportLevel::Detail => "detail",
            ReportLevel::Statement => "statement",
            ReportLevel::StatementStep => "step",
            ReportLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Sink for progress messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: ReportLevel, message: &str);
}

/// Routes progress messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Main | ReportLevel::Alter => log::info!("{}", message),
            ReportLevel::Detail | ReportLevel::Statement => log::debug!("{}", message),
            ReportLevel::StatementStep => log::trace!("{}", message),
            ReportLevel::Error => log::warn!("{}", message),
        }
    }
}
