//! aa-core - Core library for applyalter
//!
//! This crate provides the alter script model, run modes, the database
//! instance configuration, and the sources alters are loaded from. Nothing in
//! here talks to a database.

pub mod alter;
pub mod check;
pub mod config;
pub mod error;
pub mod names;
pub mod run_mode;
pub mod source;
pub mod statement;

pub use alter::Alter;
pub use check::{Check, CheckKind, CHECK_OK};
pub use config::{Engine, InstanceConfig, InstancesConfig};
pub use error::{CoreError, CoreResult};
pub use names::{AlterId, InstanceId, InstanceType};
pub use run_mode::{IsolationLevel, RunMode};
pub use source::load_alters;
pub use statement::{AlterStatement, MigrationIds, MigrationProc};
