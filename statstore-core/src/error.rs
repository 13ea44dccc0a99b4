//! Error types for statstore.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for statstore operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Main error type for statstore.
#[derive(Error, Debug)]
pub enum SinkError {
    // Configuration errors
    #[error("sink configuration incomplete: missing {field}")]
    ConfigIncomplete { field: &'static str },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid access key: {reason}")]
    InvalidKey { reason: String },

    // Table initialization errors
    #[error("table initialization failed for {table}: {reason}")]
    TableInit { table: String, reason: String },

    #[error("unrecognized table service response: HTTP {status}")]
    UnrecognizedResponse { status: u16, body: String },

    // Write path errors
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),
}
