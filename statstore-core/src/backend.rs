//! Table-store flush backend.
//!
//! Consumes the host's periodic flush events, decides whether the interval's
//! snapshot is worth persisting, and appends qualifying snapshots to the
//! configured table as immutable records. Once startup has succeeded, no
//! failure on the flush path terminates the process: failed writes are
//! logged and dropped, never retried.

use crate::config::SinkConfig;
use crate::error::{Result, SinkError};
use crate::events::{EventBus, SinkEvent, StatusEntry};
use crate::observability::metrics::{
    record_flush_accepted, record_flush_skipped, record_insert_failure,
};
use crate::snapshot::{MetricsSnapshot, Record};
use crate::store::{TableInit, TableStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Fixed category label under which status entries are reported.
pub const STATUS_CATEGORY: &str = "statstore";

/// Backend instance owning the sink configuration and its store handle.
pub struct TableBackend {
    config: SinkConfig,
    store: Arc<dyn TableStore>,
    // Both stamps are set to the startup time and are not updated by the
    // flush path; status reports them as-is.
    last_flush: i64,
    last_exception: i64,
}

impl std::fmt::Debug for TableBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableBackend")
            .field("config", &self.config)
            .field("last_flush", &self.last_flush)
            .field("last_exception", &self.last_exception)
            .finish_non_exhaustive()
    }
}

impl TableBackend {
    /// Create a backend over `store`.
    ///
    /// Fails if any required configuration field is missing. The host treats
    /// that as fatal and must terminate without starting the event loop.
    pub fn new(startup_time: i64, config: SinkConfig, store: Arc<dyn TableStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, store, last_flush: startup_time, last_exception: startup_time })
    }

    /// Ensure the target table exists.
    ///
    /// Every failure here is fatal to startup: transport and auth errors, and
    /// equally a response the client does not recognize. The event loop may
    /// already be running while this resolves; a flush racing ahead of table
    /// creation fails at insert time and is logged like any other write
    /// failure.
    pub async fn init_table(&self) -> Result<()> {
        let table = &self.config.table;
        match self.store.ensure_table(table).await {
            Ok(TableInit::Created) => {
                info!(table = %table, "connected to table store, table created");
                Ok(())
            }
            Ok(TableInit::AlreadyExists) => {
                info!(table = %table, "connected to table store, table already existed");
                Ok(())
            }
            Ok(TableInit::Unrecognized { status, body }) => {
                warn!(table = %table, "unrecognized ensure-table response, printing raw response");
                debug!(status, body = %body, "raw ensure-table response");
                Err(SinkError::UnrecognizedResponse { status, body })
            }
            Err(e) => {
                error!(table = %table, error = %e, "table initialization failed");
                Err(e)
            }
        }
    }

    /// Start the event loop, subscribing this backend to `bus`.
    ///
    /// The subscription is live immediately, before any table-readiness
    /// confirmation.
    pub fn spawn(self: Arc<Self>, bus: &EventBus) -> JoinHandle<()> {
        let mut events = bus.subscribe();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    SinkEvent::Flush { timestamp, snapshot } => {
                        self.handle_flush(timestamp, &snapshot);
                    }
                    SinkEvent::Status { reply } => {
                        self.status(|error, category, key, value| {
                            let _ = reply.send(StatusEntry { error, category, key, value });
                        });
                    }
                }
            }
        })
    }

    /// Handle one flush event.
    ///
    /// Never blocks and never fails: a qualifying snapshot is serialized and
    /// handed to a detached write task, anything else is a silent skip. The
    /// write's outcome surfaces only in the log.
    pub fn handle_flush(&self, timestamp: i64, snapshot: &Arc<MetricsSnapshot>) {
        let received = snapshot.received();
        if !self.config.sample_zero && received <= 0.0 {
            // Empty interval: persisting it would only fill the table with
            // no-op rows. Skipped without a log line.
            record_flush_skipped();
            return;
        }

        if self.config.debug {
            debug!(timestamp, snapshot = ?snapshot, "flush snapshot");
        }

        let record = match Record::for_snapshot(&self.config.partition_key, snapshot) {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "failed to serialize snapshot, dropping");
                return;
            }
        };

        record_flush_accepted();

        let store = Arc::clone(&self.store);
        let table = self.config.table.clone();
        let account = self.config.account.clone();
        let debug_records = self.config.debug;
        tokio::spawn(async move {
            match store.insert(&table, &record).await {
                Err(e) => {
                    record_insert_failure("transport");
                    error!(table = %table, error = %e, "failed to insert record");
                }
                Ok(response) if response.is_successful => {
                    if debug_records {
                        if let Ok(pretty) = serde_json::to_string_pretty(&record) {
                            debug!(record = %pretty, "record written");
                        }
                    }
                    info!(
                        table = %table,
                        account = %account,
                        timestamp,
                        "successfully inserted metrics snapshot"
                    );
                }
                Ok(response) => {
                    record_insert_failure("rejected");
                    error!(
                        table = %table,
                        status = response.status,
                        body = %response.body,
                        "table service rejected record"
                    );
                }
            }
        });
    }

    /// Report the backend's diagnostic stamps through `write`.
    ///
    /// Invokes the callback once per tracked key under [`STATUS_CATEGORY`],
    /// never with an error. A pure read of in-memory state.
    pub fn status<F>(&self, mut write: F)
    where
        F: FnMut(Option<String>, &'static str, &'static str, i64),
    {
        for (key, value) in [("lastFlush", self.last_flush), ("lastException", self.last_exception)]
        {
            write(None, STATUS_CATEGORY, key, value);
        }
    }
}
