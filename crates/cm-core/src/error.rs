//! Error types for cm-core

use thiserror::Error;

/// Core error type for cqlmig
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Environment name not present in the configuration
    #[error("[E004] Unknown environment '{name}'. Available environments: {available}")]
    UnknownEnvironment { name: String, available: String },

    /// E005: Script file name does not follow `<version>_<name>.<environment>.cql`
    #[error("[E005] Failed to create migration from file '{path}': file did not match the expected naming convention")]
    NamingConvention { path: String },

    /// E006: Invalid migration version string
    #[error("[E006] Invalid migration version '{value}': expected 12 digits (YYYYMMDDhhmm)")]
    InvalidVersion { value: String },

    /// E007: Block comments are not understood by the statement splitter
    #[error("[E007] Unsupported block comment '/*' at line {line}")]
    UnsupportedBlockComment { line: usize },

    /// E008: Migration file already exists
    #[error("[E008] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// E009: Scripts directory could not be read
    #[error("[E009] Failed to read scripts directory '{path}': {source}")]
    ScriptsDir {
        path: String,
        source: std::io::Error,
    },

    /// E010: IO error with file path context
    #[error("[E010] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E011: IO error
    #[error("[E011] IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
