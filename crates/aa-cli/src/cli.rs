//! CLI argument definitions using clap derive API

use aa_core::RunMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// applyalter - Apply idempotent alter scripts to a fleet of databases
#[derive(Parser, Debug)]
#[command(name = "applyalter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply alter scripts to the configured instances
    Apply(ApplyArgs),

    /// Load configuration and alters without connecting to anything
    Validate(ValidateArgs),
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Keep going after failures and report them all at the end
    #[arg(short, long)]
    pub ignore_failures: bool,

    /// Print statements only, or execute them
    #[arg(short, long, value_enum, default_value = "sharp")]
    pub run_mode: RunModeArg,

    /// User name recorded in the audit log (default: $USER)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Print the full error chain with debug details on failure
    #[arg(short, long)]
    pub stacktrace: bool,

    /// Database instance configuration file
    pub config: PathBuf,

    /// Alter files, directories, or zip archives, applied in the given order
    #[arg(required = true)]
    pub alters: Vec<PathBuf>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Database instance configuration file
    pub config: PathBuf,

    /// Alter files, directories, or zip archives
    #[arg(required = true)]
    pub alters: Vec<PathBuf>,
}

/// Run mode choices
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunModeArg {
    /// Report every statement, execute nothing
    Print,
    /// Execute statements and commit
    Sharp,
}

impl From<RunModeArg> for RunMode {
    fn from(arg: RunModeArg) -> Self {
        match arg {
            RunModeArg::Print => RunMode::Print,
            RunModeArg::Sharp => RunMode::Sharp,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
