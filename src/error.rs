//! Error types for the ww-virome library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum VirError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error in {path}: {source}")]
    SampleJson {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Expected {expected} files, got {actual}")]
    FileCountMismatch { expected: usize, actual: usize },

    #[error("Malformed composite label {label:?}: {parts} parts")]
    MalformedLabel { label: String, parts: usize },

    #[error("Invalid value for taxon '{taxon}' in {path}: {value}")]
    InvalidValue {
        path: String,
        taxon: String,
        value: String,
    },

    #[error("Duplicate sample label '{0}'")]
    DuplicateSample(String),

    #[error("Unknown sample: {0}")]
    UnknownSample(String),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, VirError>;
