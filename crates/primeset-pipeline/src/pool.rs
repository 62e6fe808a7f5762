//! Fixed-size classifier worker pool
//!
//! Each worker is a blocking thread that pulls one candidate at a time,
//! classifies it inline and hands the record to the writer. In-flight work is
//! therefore bounded by the worker count plus the two channel capacities.

use parking_lot::Mutex;
use primeset_classifiers::Classifier;
use primeset_core::{Candidate, Record};
use primeset_telemetry::Telemetry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Pool of `workers` classifier threads sharing one work queue
pub struct ClassifierPool {
    workers: usize,
    classifier: Arc<dyn Classifier>,
    telemetry: Telemetry,
}

impl ClassifierPool {
    /// Create a pool; at least one worker is always started
    pub fn new(workers: usize, classifier: Arc<dyn Classifier>, telemetry: Telemetry) -> Self {
        Self {
            workers: workers.max(1),
            classifier,
            telemetry,
        }
    }

    /// Number of workers this pool starts
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Start the workers
    ///
    /// Each handle resolves to the number of records that worker produced.
    /// The output channel closes once every worker has exited.
    pub fn spawn(
        self,
        work: mpsc::Receiver<Candidate>,
        output: mpsc::Sender<Record>,
    ) -> Vec<JoinHandle<u64>> {
        let work = Arc::new(Mutex::new(work));

        debug!(
            workers = self.workers,
            classifier = self.classifier.name(),
            "Starting classifier pool"
        );

        (0..self.workers)
            .map(|id| {
                let work = Arc::clone(&work);
                let output = output.clone();
                let classifier = Arc::clone(&self.classifier);
                let telemetry = self.telemetry.clone();
                tokio::task::spawn_blocking(move || {
                    run_worker(id, &work, &output, classifier.as_ref(), &telemetry)
                })
            })
            .collect()
    }
}

fn run_worker(
    id: usize,
    work: &Mutex<mpsc::Receiver<Candidate>>,
    output: &mpsc::Sender<Record>,
    classifier: &dyn Classifier,
    telemetry: &Telemetry,
) -> u64 {
    let mut produced = 0u64;

    loop {
        // the queue lock is released before classification starts
        let next = work.lock().blocking_recv();
        let Some(candidate) = next else {
            break;
        };

        let record = classifier.classify(candidate);
        telemetry.record_classified(record.prime, Duration::from_nanos(record.duration_ns));

        if output.blocking_send(record).is_err() {
            warn!(worker = id, "Output channel closed, stopping worker");
            break;
        }
        produced += 1;
    }

    debug!(worker = id, produced, "Worker finished");
    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use primeset_classifiers::{NumberClassifier, TupleIndex};
    use std::collections::BTreeSet;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pool_classifies_every_candidate_once() {
        let classifier: Arc<dyn Classifier> =
            Arc::new(NumberClassifier::new(Arc::new(TupleIndex::empty())));
        let telemetry = Telemetry::default();
        let pool = ClassifierPool::new(4, classifier, telemetry.clone());

        let (work_tx, work_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let handles = pool.spawn(work_rx, out_tx);

        let feeder = tokio::spawn(async move {
            for value in 0..200u64 {
                work_tx.send(Candidate::new(value)).await.unwrap();
            }
        });

        let mut values = BTreeSet::new();
        while let Some(record) = out_rx.recv().await {
            assert!(values.insert(record.value), "duplicate {}", record.value);
        }
        feeder.await.unwrap();

        let produced: u64 = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|h| h.unwrap())
            .sum();

        assert_eq!(produced, 200);
        assert_eq!(values, (0..200).collect::<BTreeSet<_>>());

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.primes, 46);
        assert_eq!(snapshot.composites, 154);
    }

    #[test]
    fn test_worker_count_floor() {
        let classifier: Arc<dyn Classifier> =
            Arc::new(NumberClassifier::new(Arc::new(TupleIndex::empty())));
        let pool = ClassifierPool::new(0, classifier, Telemetry::default());
        assert_eq!(pool.workers(), 1);
    }
}
