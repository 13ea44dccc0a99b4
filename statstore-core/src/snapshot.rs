//! Metrics snapshot and persisted record shapes.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Counter the aggregation engine increments for every metric it accepts
/// during an interval. The flush gate reads this one counter; the rest of the
/// snapshot is opaque payload.
pub const METRICS_RECEIVED: &str = "statsd.metrics_received";

/// One aggregation interval's worth of metrics, as delivered by the engine.
///
/// The sink only ever reads [`METRICS_RECEIVED`]; everything else is carried
/// through to the serialized record untouched. Empty sections are omitted
/// from the serialized form, so a counters-only snapshot round-trips as
/// `{"counters":{...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub counters: HashMap<String, f64>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub gauges: HashMap<String, f64>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub timers: HashMap<String, Vec<f64>>,
}

impl MetricsSnapshot {
    /// Number of metrics the engine received during this interval.
    ///
    /// Defaults to 0 when the counter is absent.
    pub fn received(&self) -> f64 {
        self.counters.get(METRICS_RECEIVED).copied().unwrap_or(0.0)
    }
}

/// A single persisted row: one snapshot, written once, never updated.
///
/// Field names follow the table service's entity conventions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Fixed grouping key from configuration.
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,

    /// Fresh UUID per record; distinguishes records within a partition.
    #[serde(rename = "RowKey")]
    pub row_key: String,

    /// The full snapshot, JSON-serialized.
    #[serde(rename = "Metrics")]
    pub metrics: String,
}

impl Record {
    /// Build the record for one snapshot under the given partition key.
    pub fn for_snapshot(partition_key: &str, snapshot: &MetricsSnapshot) -> Result<Self> {
        Ok(Self {
            partition_key: partition_key.to_string(),
            row_key: Uuid::new_v4().to_string(),
            metrics: serde_json::to_string(snapshot)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_defaults_to_zero() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.received(), 0.0);

        let mut snapshot = MetricsSnapshot::default();
        snapshot.counters.insert(METRICS_RECEIVED.to_string(), 7.0);
        assert_eq!(snapshot.received(), 7.0);
    }

    #[test]
    fn test_counters_only_snapshot_serializes_without_empty_sections() {
        let mut snapshot = MetricsSnapshot::default();
        snapshot.counters.insert(METRICS_RECEIVED.to_string(), 5.0);
        snapshot.counters.insert("foo".to_string(), 1.0);

        let json = serde_json::to_string(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["counters"]);
        assert_eq!(object["counters"]["foo"], 1.0);
    }

    #[test]
    fn test_snapshot_roundtrip_through_record() {
        let mut snapshot = MetricsSnapshot::default();
        snapshot.counters.insert(METRICS_RECEIVED.to_string(), 3.0);
        snapshot.gauges.insert("load".to_string(), 0.5);
        snapshot.timers.insert("rt".to_string(), vec![1.0, 2.0]);

        let record = Record::for_snapshot("p1", &snapshot).unwrap();
        assert_eq!(record.partition_key, "p1");

        let decoded: MetricsSnapshot = serde_json::from_str(&record.metrics).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_row_keys_are_unique() {
        let snapshot = MetricsSnapshot::default();
        let keys: std::collections::HashSet<String> = (0..1000)
            .map(|_| Record::for_snapshot("p", &snapshot).unwrap().row_key)
            .collect();
        assert_eq!(keys.len(), 1000);
    }
}
