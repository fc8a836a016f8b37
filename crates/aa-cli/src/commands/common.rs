//! Shared utilities for CLI commands

use aa_apply::{ApplyError, ReportLevel, Reporter};
use aa_core::{load_alters, Alter, InstancesConfig};
use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and connections are released.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the failure was already printed.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the instance configuration and every alter, in command-line order.
pub(crate) fn load_inputs(config: &Path, alters: &[PathBuf]) -> Result<(InstancesConfig, Vec<Alter>)> {
    let config = InstancesConfig::load(config)
        .with_context(|| format!("Failed to load instance configuration {}", config.display()))?;
    let alters = load_alters(alters).context("Failed to load alters")?;
    Ok((config, alters))
}

/// User recorded in the audit log: the explicit name, else `$USER`, else `$USERNAME`.
pub(crate) fn resolve_username(explicit: Option<&str>) -> Result<String> {
    username_from(explicit, |key| std::env::var(key).ok())
}

fn username_from(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| env("USER"))
        .or_else(|| env("USERNAME"))
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .context("Cannot determine the user name; pass one with --user")
}

/// Print a failed batch to stderr.
///
/// With `debug` the error's `Debug` form is printed, otherwise every message
/// of its causal chain, one per line.
pub(crate) fn print_apply_error(err: &ApplyError, debug: bool) {
    if debug {
        eprintln!("{:?}", err);
        return;
    }
    for message in err.messages() {
        eprintln!("{}", message);
    }
}

/// Prints progress messages up to a verbosity threshold.
///
/// Errors always go to stderr; everything else goes to stdout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConsoleReporter {
    threshold: ReportLevel,
    timestamps: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self {
            threshold: if verbose {
                ReportLevel::StatementStep
            } else {
                ReportLevel::Statement
            },
            timestamps: verbose,
        }
    }

    pub(crate) fn shows(&self, level: ReportLevel) -> bool {
        level == ReportLevel::Error || level <= self.threshold
    }

    fn render(&self, level: ReportLevel, message: &str) -> String {
        let indent = match level {
            ReportLevel::Main | ReportLevel::Error => "",
            ReportLevel::Alter => "  ",
            ReportLevel::Detail => "    ",
            ReportLevel::Statement => "      ",
            ReportLevel::StatementStep => "        ",
        };
        if self.timestamps {
            format!("[{}] {}{}", Local::now().format("%H:%M:%S%.3f"), indent, message)
        } else {
            format!("{}{}", indent, message)
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, level: ReportLevel, message: &str) {
        if !self.shows(level) {
            log::trace!("{}: {}", level, message);
            return;
        }
        let line = self.render(level, message);
        if level == ReportLevel::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
