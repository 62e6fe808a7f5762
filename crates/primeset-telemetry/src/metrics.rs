//! Counters and latency tracking

use crate::moving_average::MovingAverage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default number of latency samples kept by the moving average
pub const DEFAULT_LATENCY_WINDOW: usize = 100;

/// Shared telemetry handle for the pipeline
///
/// Cloning is cheap and every clone updates the same counters. Counters are
/// also mirrored into the `metrics` facade, which is a no-op unless a
/// recorder has been installed.
#[derive(Clone)]
pub struct Telemetry {
    inner: Arc<TelemetryInner>,
}

struct TelemetryInner {
    primes: AtomicU64,
    composites: AtomicU64,
    printed: AtomicU64,
    latency: Mutex<MovingAverage>,
}

impl Telemetry {
    /// Create a telemetry handle averaging latency over `window` samples
    pub fn new(window: usize) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                primes: AtomicU64::new(0),
                composites: AtomicU64::new(0),
                printed: AtomicU64::new(0),
                latency: Mutex::new(MovingAverage::new(window)),
            }),
        }
    }

    /// Record one classified value and the time it took
    pub fn record_classified(&self, prime: bool, elapsed: Duration) {
        let (counter, kind) = if prime {
            (&self.inner.primes, "prime")
        } else {
            (&self.inner.composites, "composite")
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let secs = elapsed.as_secs_f64();
        self.inner.latency.lock().add(secs);

        ::metrics::counter!("primeset_classified_total", "kind" => kind).increment(1);
        ::metrics::histogram!("primeset_classify_seconds").record(secs);
    }

    /// Record one record written to the sinks
    pub fn record_printed(&self) {
        self.inner.printed.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("primeset_records_written_total").increment(1);
    }

    /// Number of live handles sharing these counters
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Get current telemetry snapshot
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            primes: self.inner.primes.load(Ordering::Relaxed),
            composites: self.inner.composites.load(Ordering::Relaxed),
            printed: self.inner.printed.load(Ordering::Relaxed),
            avg_secs_per_op: self.inner.latency.lock().average(),
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW)
    }
}

/// Register descriptions for every metric the pipeline emits
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        "primeset_classified_total",
        "Values classified, labelled by kind (prime or composite)"
    );
    ::metrics::describe_counter!(
        "primeset_records_written_total",
        "Records written to the output sinks"
    );
    ::metrics::describe_histogram!(
        "primeset_classify_seconds",
        ::metrics::Unit::Seconds,
        "Time spent classifying a single value"
    );
    ::metrics::describe_gauge!(
        "primeset_moving_avg_seconds",
        ::metrics::Unit::Seconds,
        "Moving average of classification time over the latency window"
    );
}

/// Snapshot of current counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub primes: u64,
    pub composites: u64,
    pub printed: u64,
    pub avg_secs_per_op: f64,
}

impl TelemetrySnapshot {
    /// Total values classified
    pub fn classified(&self) -> u64 {
        self.primes + self.composites
    }

    /// Records classified but not yet written
    pub fn in_flight(&self) -> u64 {
        self.classified().saturating_sub(self.printed)
    }
}
