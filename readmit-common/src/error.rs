//! Common error types for the readmission risk tools

use thiserror::Error;

/// Common result type for readmit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the readmit crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model artifact loading or structural error
    #[error("Model error: {0}")]
    Model(String),

    /// Feature set/order does not match the model's training-time schema
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Categorical value absent from its encoding table
    #[error("Unknown {field} value: {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    /// Numeric input outside its declared bound
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Malformed bulk CSV input
    #[error("CSV error at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
