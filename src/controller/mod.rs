//! # Controller
//!
//! Periodic synchronization of one secret from the configured provider.
//!
//! - `schedule`: lock-free "next eligible run" cell
//! - `server`: HTTP server for metrics and health checks
//!
//! The driver loop wakes every second, asks the schedule whether a run is due and,
//! if so, fetches the secret. Fetch errors are logged and the loop keeps going; the
//! next attempt happens one regular interval later.

pub mod schedule;
pub mod server;

pub use schedule::RunSchedule;

use crate::constants::{MIN_INTERVAL, TICK_INTERVAL};
use crate::observability::metrics::{Metrics, RESULT_SUCCESS};
use crate::provider::{SecretError, SecretProvider, SecretValue};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

/// Result of a successful synchronization
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub secret_name: String,
    pub provider: &'static str,
    pub value: SecretValue,
    pub fetched_at: DateTime<Utc>,
    pub duration: Duration,
}

pub struct Controller {
    provider: Arc<dyn SecretProvider>,
    secret_name: String,
    schedule: RunSchedule,
    metrics: Metrics,
    reveal_secret: bool,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("provider", &self.provider.provider_name())
            .field("secret_name", &self.secret_name)
            .field("schedule", &self.schedule)
            .field("reveal_secret", &self.reveal_secret)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Create a controller syncing `secret_name` every `interval`
    #[must_use]
    pub fn new(
        provider: Arc<dyn SecretProvider>,
        secret_name: impl Into<String>,
        interval: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            provider,
            secret_name: secret_name.into(),
            schedule: RunSchedule::new(MIN_INTERVAL, interval),
            metrics,
            reveal_secret: false,
        }
    }

    /// Log the secret value at debug level after each successful sync
    #[must_use]
    pub fn with_reveal_secret(mut self, reveal_secret: bool) -> Self {
        self.reveal_secret = reveal_secret;
        self
    }

    #[must_use]
    pub fn schedule(&self) -> &RunSchedule {
        &self.schedule
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Request a sync no earlier than `now` plus the minimum interval
    pub fn schedule_run_once(&self, now: Instant) {
        self.schedule.schedule_run_once(now);
    }

    /// Claim the next run if it is due at `now`
    pub fn should_run_once(&self, now: Instant) -> bool {
        self.schedule.should_run_once(now)
    }

    /// Fetch the secret once
    ///
    /// On success the last-sync gauge is set to the current time. Errors are
    /// returned as-is and never retried here.
    ///
    /// # Errors
    /// Returns the provider's [`SecretError`].
    pub async fn run_once(&self) -> Result<SyncOutcome, SecretError> {
        let provider = self.provider.provider_name();
        let span = info_span!(
            "controller.sync",
            secret.name = %self.secret_name,
            provider = provider
        );
        let start = Instant::now();

        async move {
            let result = self.provider.get_secret(&self.secret_name).await;
            let duration = start.elapsed();

            match result {
                Ok(value) => {
                    let fetched_at = Utc::now();
                    #[allow(
                        clippy::cast_precision_loss,
                        reason = "Millisecond Unix timestamps fit an f64 mantissa"
                    )]
                    let timestamp = fetched_at.timestamp_millis() as f64 / 1000.0;
                    self.metrics.set_last_sync_timestamp(timestamp);
                    self.metrics
                        .record_sync(RESULT_SUCCESS, duration.as_secs_f64());

                    info!(
                        secret.length = value.len(),
                        secret.binary = value.is_binary(),
                        duration_ms = duration.as_millis(),
                        "Secret synchronized"
                    );
                    if self.reveal_secret {
                        debug!(secret.value = %value.reveal(), "Secret value");
                    }

                    Ok(SyncOutcome {
                        secret_name: self.secret_name.clone(),
                        provider,
                        value,
                        fetched_at,
                        duration,
                    })
                }
                Err(e) => {
                    self.metrics.record_sync(e.kind(), duration.as_secs_f64());
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Drive synchronizations until `cancel` fires
    ///
    /// Cancellation is observed between ticks; an in-flight fetch is never interrupted.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            secret.name = %self.secret_name,
            provider = self.provider.provider_name(),
            interval_secs = self.schedule.interval().as_secs_f64(),
            min_interval_secs = self.schedule.min_interval().as_secs_f64(),
            "Starting synchronization loop"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("Synchronization loop stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            if !self.should_run_once(Instant::now()) {
                continue;
            }

            if let Err(e) = self.run_once().await {
                error!(
                    error = %e,
                    error.kind = e.kind(),
                    secret.name = %self.secret_name,
                    "Failed to synchronize secret"
                );
            }
        }
    }

    /// Delay the first sync by the minimum interval, then run until cancelled
    pub async fn run_until_cancelled(&self, cancel: CancellationToken) {
        self.schedule_run_once(Instant::now());
        self.run(cancel).await;
    }
}
