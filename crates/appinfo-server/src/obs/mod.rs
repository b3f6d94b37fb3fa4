//! Observability: tracing setup and in-process metrics.
//!
//! Metrics are stored as atomics in `MetricsRegistry` instances grouped by a
//! `MetricsHub`, and rendered by the `/metrics` handler.

pub mod collectors;
pub mod metrics;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}
