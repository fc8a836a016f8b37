//! Error types for aa-apply

use aa_db::DbError;
use std::error::Error as StdError;
use thiserror::Error;

/// Failure of one (alter, instance) pair, of a commit, or of the whole batch.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// A001: Alter references an instance type no instance has
    #[error("[A001] Unknown database type '{instance_type}' in alter {alter}. Possible values: {known}")]
    UnknownInstanceType {
        alter: String,
        instance_type: String,
        known: String,
    },

    /// A002: Connection could not be established
    #[error("[A002] Cannot connect to instance {instance}")]
    Connect {
        instance: String,
        #[source]
        source: DbError,
    },

    /// A003: Schema or isolation level could not be set
    #[error("[A003] Cannot prepare instance {instance} for alter {alter}")]
    Prepare {
        alter: String,
        instance: String,
        #[source]
        source: DbError,
    },

    /// A004: Idempotency check could not be executed
    #[error("[A004] Can not check alter {alter} on instance {instance}")]
    Check {
        alter: String,
        instance: String,
        #[source]
        source: DbError,
    },

    /// A005: Statement failed and is not allowed to
    #[error("[A005] Alter {alter} failed on instance {instance} executing: {statement}")]
    Statement {
        alter: String,
        instance: String,
        statement: String,
        #[source]
        source: DbError,
    },

    /// A006: Commit failed
    #[error("[A006] Error committing instance {instance}")]
    Commit {
        instance: String,
        #[source]
        source: DbError,
    },

    /// A007: Several failures collected under the ignore-failures policy
    #[error("[A007] {} failure(s) while applying alters:\n{}", .0.len(), render_failures(.0))]
    Aggregate(Vec<ApplyError>),
}

/// Result type alias for ApplyError
pub type ApplyResult<T> = Result<T, ApplyError>;

impl ApplyError {
    /// Every message in the causal chain, outermost first.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut cause = self.source();
        while let Some(err) = cause {
            messages.push(err.to_string());
            cause = err.source();
        }
        messages
    }

    /// Number of individual failures this error stands for.
    pub fn failure_count(&self) -> usize {
        match self {
            ApplyError::Aggregate(errors) => errors.len(),
            _ => 1,
        }
    }
}

fn render_failures(errors: &[ApplyError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {}", i + 1, err.messages().join(": ")))
        .collect::<Vec<_>>()
        .join("\n")
}
