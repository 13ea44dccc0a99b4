//! Observability infrastructure: tracing and sink counters.
//!
//! Log lines are the only externally observable record of per-flush
//! outcomes, so the subscriber is initialized before anything else runs.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Initialize the global tracing subscriber.
///
/// Must be called once at process startup before any other operations.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .init();

    metrics::register_sink_metrics();

    Ok(())
}
