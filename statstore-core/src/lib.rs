//! statstore core library.
//!
//! Shared pipeline for persisting aggregated metrics snapshots into a remote
//! key-partitioned table store: one immutable record per accepted flush, with
//! write outcomes surfaced through the log rather than propagated to the host.

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod observability;
pub mod snapshot;
pub mod store;

// Re-export commonly used items
pub use backend::{TableBackend, STATUS_CATEGORY};
pub use config::SinkConfig;
pub use error::{Result, SinkError};
pub use events::{EventBus, EventSubscriber, SinkEvent, StatusEntry};
pub use snapshot::{MetricsSnapshot, Record, METRICS_RECEIVED};
pub use store::{AzureTableClient, InsertResponse, MemoryTableStore, TableInit, TableStore};
