//! Fail-fast or collect-and-continue failure aggregation.
//!
//! [`Failures`] is the single place that decides whether a failure stops the
//! batch. Statement, check and commit failures all pass through it.

use crate::error::{ApplyError, ApplyResult};

/// What to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure
    FailFast,
    /// Record every failure and report them together at the end
    Collect,
}

impl FailurePolicy {
    pub fn from_ignore_failures(ignore_failures: bool) -> Self {
        if ignore_failures {
            FailurePolicy::Collect
        } else {
            FailurePolicy::FailFast
        }
    }
}

/// Ordered failures of one batch.
#[derive(Debug)]
pub struct Failures {
    policy: FailurePolicy,
    errors: Vec<ApplyError>,
}

impl Failures {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Record a failure, or return it right away under [`FailurePolicy::FailFast`].
    pub fn add_or_abort(&mut self, err: ApplyError) -> ApplyResult<()> {
        match self.policy {
            FailurePolicy::FailFast => Err(err),
            FailurePolicy::Collect => {
                log::debug!("Collected failure #{}: {}", self.errors.len() + 1, err);
                self.errors.push(err);
                Ok(())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok` when nothing was collected, otherwise one error listing every failure.
    pub fn into_result(self) -> ApplyResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApplyError::Aggregate(self.errors))
        }
    }
}
