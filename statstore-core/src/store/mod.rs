//! Table-store client abstraction.
//!
//! The sink talks to its store through the [`TableStore`] trait so the remote
//! REST client and the in-process store are interchangeable behind an `Arc`.

use crate::error::Result;
use crate::snapshot::Record;
use async_trait::async_trait;

mod azure;
mod memory;

pub use azure::AzureTableClient;
pub use memory::MemoryTableStore;

/// Outcome of an ensure-table call that reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableInit {
    /// The table did not exist and was created.
    Created,

    /// The table was already present.
    AlreadyExists,

    /// The service answered, but not in a shape this client recognizes.
    /// The backend treats such a response as untrustworthy.
    Unrecognized { status: u16, body: String },
}

/// Raw outcome of an insert call that reached the service.
#[derive(Debug, Clone)]
pub struct InsertResponse {
    /// Whether the service accepted the record.
    pub is_successful: bool,

    /// HTTP status code of the response.
    pub status: u16,

    /// Response body, empty on success.
    pub body: String,
}

/// Remote table store: ensure-table at startup, one insert per accepted flush.
///
/// Implementations are shared behind a single `Arc` across all in-flight
/// operations; the sink issues concurrent inserts without synchronization.
/// Transport-level failures are errors; a response the service did return is
/// reported through [`TableInit`] / [`InsertResponse`] instead.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Create `table` if it does not exist. Idempotent.
    async fn ensure_table(&self, table: &str) -> Result<TableInit>;

    /// Append one record to `table`.
    async fn insert(&self, table: &str, record: &Record) -> Result<InsertResponse>;
}
