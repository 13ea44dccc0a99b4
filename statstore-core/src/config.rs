//! Sink configuration.

use crate::error::{Result, SinkError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the table-store sink.
///
/// The four identity fields are required; startup must not proceed when any
/// of them is missing. The remaining flags default to off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Storage account name.
    #[serde(default)]
    pub account: String,

    /// Base64-encoded shared access key for the account.
    #[serde(default)]
    pub access_key: String,

    /// Name of the table snapshots are appended to.
    #[serde(default)]
    pub table: String,

    /// Partition key shared by every record this sink writes.
    #[serde(default)]
    pub partition_key: String,

    /// Persist snapshots even for intervals in which no metrics arrived.
    #[serde(default)]
    pub sample_zero: bool,

    /// Dump snapshots and written records to the diagnostic log.
    #[serde(default)]
    pub debug: bool,

    /// Override for the table service endpoint (emulators, tests).
    /// Defaults to the public endpoint derived from the account name.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl SinkConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SinkError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SinkError::InvalidConfig {
            reason: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Check that every required field is present and non-empty.
    ///
    /// Returns the first missing field; the host treats this as fatal.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("account", &self.account),
            ("access_key", &self.access_key),
            ("table", &self.table),
            ("partition_key", &self.partition_key),
        ] {
            if value.is_empty() {
                return Err(SinkError::ConfigIncomplete { field });
            }
        }
        Ok(())
    }
}
