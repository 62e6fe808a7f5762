//! Primeset Pipeline
//!
//! The streaming classification pipeline:
//!
//! ```text
//! Generator ──(bounded work channel)──▶ ClassifierPool (N workers)
//!     ──(bounded output channel)──▶ Writer ──▶ JSON / CSV sinks
//! ```
//!
//! The tuple index is built before the generator starts and is shared
//! read-only afterwards. The two channels are the only synchronization
//! points between stages; a full channel blocks its producer, which is the
//! pipeline's only backpressure.

pub mod config;
pub mod generator;
pub mod pipeline;
pub mod pool;
pub mod sequencer;
pub mod sink;
pub mod writer;

pub use config::PipelineConfig;
pub use generator::Generator;
pub use pipeline::{Pipeline, PipelineSummary};
pub use pool::ClassifierPool;
pub use sequencer::Sequencer;
pub use sink::{csv_header, CsvSink, JsonLinesSink, RecordSink};
pub use writer::Writer;
