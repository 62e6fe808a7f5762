//! Periodic status reporting

use crate::metrics::{Telemetry, TelemetrySnapshot};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Per-second rates between two snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateSample {
    pub primes_per_sec: f64,
    pub composites_per_sec: f64,
    pub printed_per_sec: f64,
    pub avg_secs_per_op: f64,
}

impl RateSample {
    /// Rates from `previous` to `current` over `elapsed`
    ///
    /// Counters may move while the snapshots are taken, so deltas saturate
    /// at zero instead of underflowing.
    pub fn between(previous: &TelemetrySnapshot, current: &TelemetrySnapshot, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let rate = |now: u64, before: u64| {
            if secs > 0.0 {
                now.saturating_sub(before) as f64 / secs
            } else {
                0.0
            }
        };

        Self {
            primes_per_sec: rate(current.primes, previous.primes),
            composites_per_sec: rate(current.composites, previous.composites),
            printed_per_sec: rate(current.printed, previous.printed),
            avg_secs_per_op: current.avg_secs_per_op,
        }
    }
}

impl fmt::Display for RateSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed primes: {:.0} /s, Composites: {:.0} /s, Printed: {:.0} /s [{:.3} s/op]",
            self.primes_per_sec, self.composites_per_sec, self.printed_per_sec, self.avg_secs_per_op
        )
    }
}

/// Background task logging throughput at a fixed interval
pub struct StatusReporter {
    interval: Duration,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StatusReporter {
    /// Create a reporter; nothing runs until [`StatusReporter::start`]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(10)),
            stop: None,
            handle: None,
        }
    }

    /// Start sampling `telemetry` on the current runtime
    pub fn start(&mut self, telemetry: Telemetry) {
        if self.handle.is_some() {
            return;
        }

        let (tx, mut rx) = oneshot::channel();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // first tick completes immediately

            let mut previous = telemetry.snapshot();
            let mut previous_at = Instant::now();

            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => {}
                }

                let current = telemetry.snapshot();
                let now = Instant::now();
                let sample = RateSample::between(&previous, &current, now - previous_at);
                ::metrics::gauge!("primeset_moving_avg_seconds").set(sample.avg_secs_per_op);

                info!(
                    primes_per_sec = sample.primes_per_sec,
                    composites_per_sec = sample.composites_per_sec,
                    printed_per_sec = sample.printed_per_sec,
                    avg_secs_per_op = sample.avg_secs_per_op,
                    in_flight = current.in_flight(),
                    "{}",
                    sample
                );

                previous = current;
                previous_at = now;
            }
        });

        self.stop = Some(tx);
        self.handle = Some(handle);
    }

    /// Whether the background task is running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the reporter and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusReporter {
    fn drop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
