//! Error types for aa-core

use thiserror::Error;

/// Configuration and script-loading errors.
///
/// Every variant is fatal for a batch: it is raised before any alter touches a
/// database connection.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Unable to deserialize instance config from {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Duplicate instance id
    #[error("[C004] Duplicate database instance id '{id}'")]
    DuplicateInstance { id: String },

    /// C005: Alter file not found
    #[error("[C005] Alter file not found: {path}")]
    AlterNotFound { path: String },

    /// C006: Alter deserialization error
    #[error("[C006] Unable to deserialize alter {id}: {message}")]
    AlterParseError { id: String, message: String },

    /// C007: Alter content is structurally invalid
    #[error("[C007] Invalid alter {id}: {reason}")]
    AlterInvalid { id: String, reason: String },

    /// C008: Script source is neither an alter file, an archive, nor a directory
    #[error("[C008] Unknown filetype {path} (expected .yml, .yaml, .zip or a directory)")]
    UnknownFileType { path: String },

    /// C009: Archive could not be read
    #[error("[C009] Error reading archive {path}: {message}")]
    ArchiveError { path: String, message: String },

    /// C010: Unknown run mode name
    #[error("[C010] Unknown run mode '{name}' (expected print or sharp)")]
    UnknownRunMode { name: String },

    /// C011: IO error with file path context
    #[error("[C011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
