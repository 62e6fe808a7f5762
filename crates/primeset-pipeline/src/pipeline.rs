//! Pipeline orchestration

use crate::config::PipelineConfig;
use crate::generator::Generator;
use crate::pool::ClassifierPool;
use crate::sink::{CsvSink, JsonLinesSink, RecordSink};
use crate::writer::Writer;
use futures::future::join_all;
use primeset_classifiers::{Classifier, NumberClassifier, PiDigits, PiLookup, TupleIndex};
use primeset_core::{Error, Result};
use primeset_telemetry::{StatusReporter, Telemetry};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    /// Candidates produced by the generator
    pub generated: u64,

    /// Records produced by the workers
    pub classified: u64,

    /// Records written by the writer
    pub written: u64,

    /// Primes among the classified values
    pub primes: u64,

    /// Non-primes among the classified values
    pub composites: u64,

    /// Wall time of the run, including the index build
    pub elapsed: Duration,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records written ({} primes, {} composites) in {:.2}s",
            self.written,
            self.primes,
            self.composites,
            self.elapsed.as_secs_f64()
        )
    }
}

/// The streaming classification pipeline
pub struct Pipeline {
    config: PipelineConfig,
    telemetry: Telemetry,
}

impl Pipeline {
    /// Validate the configuration and prepare a pipeline
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let telemetry = Telemetry::new(config.moving_average_window);
        Ok(Self { config, telemetry })
    }

    /// Shared telemetry handle
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the lookup tables, then classify the whole range
    pub async fn run(self) -> Result<PipelineSummary> {
        let started = Instant::now();
        let sinks = self.open_sinks()?;

        let tuples = Arc::new(TupleIndex::build(&self.config.tuple_files).await);

        let mut classifier =
            NumberClassifier::new(tuples).with_totient_mode(self.config.totient);
        if let Some(pi) = self.load_pi().await {
            classifier = classifier.with_pi(pi);
        }

        self.execute(Arc::new(classifier), sinks, started).await
    }

    /// Classify the whole range with a caller-supplied classifier
    pub async fn run_with(self, classifier: Arc<dyn Classifier>) -> Result<PipelineSummary> {
        let started = Instant::now();
        let sinks = self.open_sinks()?;
        self.execute(classifier, sinks, started).await
    }

    fn open_sinks(&self) -> Result<Vec<Box<dyn RecordSink>>> {
        let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
        if let Some(path) = &self.config.json {
            sinks.push(Box::new(JsonLinesSink::open(path)?));
        }
        if let Some(path) = &self.config.csv {
            sinks.push(Box::new(CsvSink::open(path, self.config.totient)?));
        }
        Ok(sinks)
    }

    async fn load_pi(&self) -> Option<Arc<dyn PiLookup>> {
        let path = self.config.pi_file.clone()?;
        let shown = path.display().to_string();

        match tokio::task::spawn_blocking(move || PiDigits::from_file(path)).await {
            Ok(Ok(pi)) => Some(Arc::new(pi)),
            Ok(Err(e)) => {
                warn!(path = %shown, error = %e, "Failed to load pi digits, continuing without pi index");
                None
            }
            Err(e) => {
                warn!(path = %shown, error = %e, "Pi loader task failed");
                None
            }
        }
    }

    async fn execute(
        self,
        classifier: Arc<dyn Classifier>,
        sinks: Vec<Box<dyn RecordSink>>,
        started: Instant,
    ) -> Result<PipelineSummary> {
        let config = &self.config;
        let workers = config.resolved_workers();

        info!(
            start = config.start,
            end = config.end,
            workers,
            sinks = sinks.len(),
            ordered = config.ordered,
            totient = %config.totient,
            "Starting classification"
        );

        let (work_tx, work_rx) = mpsc::channel(config.work_capacity);
        let (out_tx, out_rx) = mpsc::channel(config.output_capacity);

        let mut writer = Writer::new(sinks, self.telemetry.clone());
        if config.ordered {
            writer = writer.ordered(config.start);
        }
        let writer = tokio::task::spawn_blocking(move || writer.run(out_rx));

        let pool = ClassifierPool::new(workers, classifier, self.telemetry.clone());
        let worker_handles = pool.spawn(work_rx, out_tx);

        let generator = tokio::spawn(Generator::new(config.start, config.end).run(work_tx));

        let mut reporter = StatusReporter::new(config.status_interval());
        if !config.silent {
            reporter.start(self.telemetry.clone());
        }

        let generated = generator
            .await
            .map_err(|e| Error::internal(format!("generator task failed: {}", e)));

        let mut classified = 0u64;
        let mut worker_failure = None;
        for joined in join_all(worker_handles).await {
            match joined {
                Ok(produced) => classified += produced,
                Err(e) => worker_failure = Some(e),
            }
        }

        let written = writer
            .await
            .map_err(|e| Error::internal(format!("writer task failed: {}", e)))
            .and_then(|written| written);

        // stop the reporter before propagating any stage failure
        reporter.stop().await;

        let written = written?;
        let generated = generated?;
        if let Some(e) = worker_failure {
            return Err(Error::internal(format!("classifier worker failed: {}", e)));
        }

        let snapshot = self.telemetry.snapshot();
        let summary = PipelineSummary {
            generated,
            classified,
            written,
            primes: snapshot.primes,
            composites: snapshot.composites,
            elapsed: started.elapsed(),
        };
        info!(
            generated = summary.generated,
            written = summary.written,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Pipeline finished"
        );
        Ok(summary)
    }
}
