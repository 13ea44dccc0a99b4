//! Sink counter definitions.
//!
//! Counters follow Prometheus naming conventions (`_total` suffix). Recording
//! goes through the `metrics` facade and is a no-op until the host installs a
//! recorder.

use metrics::{counter, describe_counter};

/// Register all sink counters with descriptions.
pub fn register_sink_metrics() {
    describe_counter!(
        "statstore_flush_accepted_total",
        "Flush events that passed the gate and produced a write"
    );
    describe_counter!(
        "statstore_flush_skipped_total",
        "Flush events skipped because no metrics arrived during the interval"
    );
    describe_counter!(
        "statstore_insert_failures_total",
        "Record inserts that failed (by reason: transport, rejected)"
    );
}

pub fn record_flush_accepted() {
    counter!("statstore_flush_accepted_total").increment(1);
}

pub fn record_flush_skipped() {
    counter!("statstore_flush_skipped_total").increment(1);
}

pub fn record_insert_failure(reason: &'static str) {
    counter!("statstore_insert_failures_total", "reason" => reason).increment(1);
}
