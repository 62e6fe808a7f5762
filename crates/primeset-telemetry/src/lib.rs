//! Primeset Telemetry
//!
//! Best-effort throughput telemetry for the classification pipeline.
//!
//! Provides:
//! - Atomic counters for primes, composites and written records
//! - A fixed-window moving average of per-item latency
//! - A periodic status reporter that logs per-second rates

pub mod metrics;
pub mod moving_average;
pub mod reporter;

pub use crate::metrics::{describe_metrics, Telemetry, TelemetrySnapshot, DEFAULT_LATENCY_WINDOW};
pub use crate::moving_average::MovingAverage;
pub use crate::reporter::{RateSample, StatusReporter};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{Telemetry, TelemetrySnapshot};
    pub use crate::moving_average::MovingAverage;
    pub use crate::reporter::StatusReporter;
}
