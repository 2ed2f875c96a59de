//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `cloud_secret_controller_last_sync_timestamp_seconds` - Unix time of the last successful sync
//! - `cloud_secret_controller_sync_total` - Sync attempts, labelled by `result`
//! - `cloud_secret_controller_sync_duration_seconds` - Duration of sync attempts
//!
//! Each [`Metrics`] owns its registry, so independent controllers (and tests) never
//! share state.

use anyhow::{Context, Result};
use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

pub const LAST_SYNC_TIMESTAMP: &str = "cloud_secret_controller_last_sync_timestamp_seconds";
pub const SYNC_TOTAL: &str = "cloud_secret_controller_sync_total";
pub const SYNC_DURATION: &str = "cloud_secret_controller_sync_duration_seconds";

/// `result` label value of successful syncs
pub const RESULT_SUCCESS: &str = "success";

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    last_sync_timestamp: Gauge,
    sync_total: IntCounterVec,
    sync_duration: Histogram,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("last_sync_timestamp", &self.last_sync_timestamp.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create the metrics and register them in a fresh registry
    ///
    /// # Errors
    /// Returns an error if a metric cannot be created or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let last_sync_timestamp = Gauge::new(
            LAST_SYNC_TIMESTAMP,
            "Timestamp of the last successful secret synchronization",
        )
        .context("Failed to create last sync timestamp gauge")?;

        let sync_total = IntCounterVec::new(
            Opts::new(SYNC_TOTAL, "Total number of secret synchronization attempts"),
            &["result"],
        )
        .context("Failed to create sync counter")?;

        let sync_duration = Histogram::with_opts(
            HistogramOpts::new(SYNC_DURATION, "Duration of secret synchronizations in seconds")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )
        .context("Failed to create sync duration histogram")?;

        registry.register(Box::new(last_sync_timestamp.clone()))?;
        registry.register(Box::new(sync_total.clone()))?;
        registry.register(Box::new(sync_duration.clone()))?;

        Ok(Self {
            registry,
            last_sync_timestamp,
            sync_total,
            sync_duration,
        })
    }

    pub fn set_last_sync_timestamp(&self, unix_seconds: f64) {
        self.last_sync_timestamp.set(unix_seconds);
    }

    #[must_use]
    pub fn last_sync_timestamp(&self) -> f64 {
        self.last_sync_timestamp.get()
    }

    /// Record one sync attempt; `result` is `success` or an error kind
    pub fn record_sync(&self, result: &str, duration_secs: f64) {
        self.sync_total.with_label_values(&[result]).inc();
        self.sync_duration.observe(duration_secs);
    }

    #[must_use]
    pub fn sync_count(&self, result: &str) -> u64 {
        self.sync_total.with_label_values(&[result]).get()
    }

    /// Render all metrics in the Prometheus text exposition format
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_starts_at_zero() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.last_sync_timestamp().abs() < f64::EPSILON);
        assert!(metrics.encode().unwrap().contains(LAST_SYNC_TIMESTAMP));
    }

    #[test]
    fn test_record_sync_counts_by_result() {
        let metrics = Metrics::new().unwrap();
        metrics.record_sync(RESULT_SUCCESS, 0.2);
        metrics.record_sync(RESULT_SUCCESS, 0.1);
        metrics.record_sync("not_found", 0.05);

        assert_eq!(metrics.sync_count(RESULT_SUCCESS), 2);
        assert_eq!(metrics.sync_count("not_found"), 1);

        let output = metrics.encode().unwrap();
        assert!(output.contains(r#"cloud_secret_controller_sync_total{result="success"} 2"#));
        assert!(output.contains("cloud_secret_controller_sync_duration_seconds_count 3"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.set_last_sync_timestamp(1_700_000_000.0);
        assert!(b.last_sync_timestamp().abs() < f64::EPSILON);
    }
}
