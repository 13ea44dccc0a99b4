//! In-process table store.
//!
//! Backs dry-run deployments and tests: every inserted record is kept in
//! memory, grouped by table, in insertion order.

use crate::error::Result;
use crate::snapshot::Record;
use crate::store::{InsertResponse, TableInit, TableStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Table store keeping all records in process memory.
#[derive(Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records inserted into `table` so far, in insertion order.
    pub async fn records(&self, table: &str) -> Vec<Record> {
        self.tables.read().await.get(table).cloned().unwrap_or_default()
    }

    /// Total number of records across all tables.
    pub async fn len(&self) -> usize {
        self.tables.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn ensure_table(&self, table: &str) -> Result<TableInit> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Ok(TableInit::AlreadyExists);
        }
        tables.insert(table.to_string(), Vec::new());
        Ok(TableInit::Created)
    }

    async fn insert(&self, table: &str, record: &Record) -> Result<InsertResponse> {
        let mut tables = self.tables.write().await;
        match tables.get_mut(table) {
            Some(records) => {
                records.push(record.clone());
                Ok(InsertResponse { is_successful: true, status: 204, body: String::new() })
            }
            // Mirrors the remote service: inserting into a table that was
            // never created is rejected, not an error.
            None => Ok(InsertResponse {
                is_successful: false,
                status: 404,
                body: format!("table {} not found", table),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MetricsSnapshot;

    #[tokio::test]
    async fn test_ensure_then_insert() {
        let store = MemoryTableStore::new();
        assert_eq!(store.ensure_table("metrics").await.unwrap(), TableInit::Created);
        assert_eq!(store.ensure_table("metrics").await.unwrap(), TableInit::AlreadyExists);

        let record = Record::for_snapshot("p1", &MetricsSnapshot::default()).unwrap();
        let response = store.insert("metrics", &record).await.unwrap();
        assert!(response.is_successful);
        assert_eq!(store.records("metrics").await, vec![record]);
    }

    #[tokio::test]
    async fn test_insert_into_missing_table_is_rejected() {
        let store = MemoryTableStore::new();
        let record = Record::for_snapshot("p1", &MetricsSnapshot::default()).unwrap();

        let response = store.insert("metrics", &record).await.unwrap();
        assert!(!response.is_successful);
        assert_eq!(response.status, 404);
        assert!(store.is_empty().await);
    }
}
