//! # Run Schedule
//!
//! Lock-free "next eligible run" cell shared by the driver loop and any caller that
//! wants to trigger a synchronization.
//!
//! The next run is stored as nanoseconds since the schedule was created. A value of
//! zero means the schedule is due immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RunSchedule {
    origin: Instant,
    next_run_nanos: AtomicU64,
    min_interval: Duration,
    interval: Duration,
}

fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl RunSchedule {
    /// Create a schedule that is due immediately
    ///
    /// `min_interval` delays runs requested through [`RunSchedule::schedule_run_once`];
    /// `interval` separates two runs granted by [`RunSchedule::should_run_once`].
    #[must_use]
    pub fn new(min_interval: Duration, interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            next_run_nanos: AtomicU64::new(0),
            min_interval,
            interval,
        }
    }

    /// Instant the schedule measures from
    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    fn offset(&self, now: Instant) -> u64 {
        as_nanos(now.saturating_duration_since(self.origin))
    }

    /// Earliest instant at which the next run is granted
    #[must_use]
    pub fn next_eligible_run(&self) -> Instant {
        self.origin + Duration::from_nanos(self.next_run_nanos.load(Ordering::Acquire))
    }

    /// Request a run no earlier than `now + min_interval`
    ///
    /// The deadline only moves forward: a pending later deadline is kept, and a
    /// burst of requests collapses into one run.
    pub fn schedule_run_once(&self, now: Instant) {
        let next = self.offset(now).saturating_add(as_nanos(self.min_interval));
        self.next_run_nanos.fetch_max(next, Ordering::AcqRel);
    }

    /// Check whether a run is due at `now` and, if so, claim it
    ///
    /// Claiming moves the deadline to `now + interval`. Of several callers racing
    /// on the same window, exactly one gets `true`.
    pub fn should_run_once(&self, now: Instant) -> bool {
        let now_nanos = self.offset(now);
        let interval_nanos = as_nanos(self.interval);

        self.next_run_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (now_nanos >= next).then(|| now_nanos.saturating_add(interval_nanos))
            })
            .is_ok()
    }
}
