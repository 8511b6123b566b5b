//! Error types for modsheet-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in modsheet-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A sheet file could not be interpreted as a view
    #[error("failed to parse sheet '{path}': {message}")]
    SheetParse { path: PathBuf, message: String },

    /// The module store lacks its expected top-level structure
    #[error("malformed module store: {0}")]
    Format(String),

    /// A sheet's layout disagrees with its schema-derived header
    #[error("sheet '{sheet}' does not match its schema: {message}")]
    SchemaMismatch { sheet: String, message: String },

    /// Row lookup and row content disagree; indicates a broken id index
    #[error("fuse consistency violation: row id '{row_id}' resolved to record '{record_id}'")]
    FuseConsistency { row_id: String, record_id: String },

    /// Two records in the store carry the same id
    #[error("duplicate module id '{0}'")]
    DuplicateId(String),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
