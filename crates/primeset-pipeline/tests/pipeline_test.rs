//! End-to-end tests for the classification pipeline

use primeset_classifiers::{Classifier, NumberClassifier, TotientMode, TupleIndex, TupleSource};
use primeset_core::{Candidate, Record, TupleDegree};
use primeset_pipeline::{csv_header, Pipeline, PipelineConfig};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn base_config(dir: &TempDir, start: u64, end: u64) -> PipelineConfig {
    let twins = dir.path().join("twin.txt");
    std::fs::write(&twins, "(3, 5)\n(5, 7)\n(11, 13)\n").unwrap();

    PipelineConfig {
        start,
        end,
        workers: Some(2),
        silent: true,
        tuple_files: vec![TupleSource::new("twin", twins)],
        json: Some(dir.path().join("out.jsonl")),
        ..Default::default()
    }
}

fn read_json(path: &Path) -> Vec<Record> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn json_path(config: &PipelineConfig) -> PathBuf {
    config.json.clone().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_classifies_whole_range() {
    let dir = TempDir::new().unwrap();
    let config = base_config(&dir, 1, 20);
    let out = json_path(&config);

    let summary = Pipeline::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.generated, 19);
    assert_eq!(summary.classified, 19);
    assert_eq!(summary.written, 19);
    // 2, 3, 5, 7, 11, 13, 17, 19
    assert_eq!(summary.primes, 8);
    assert_eq!(summary.composites, 11);

    let records = read_json(&out);
    let values: BTreeSet<u64> = records.iter().map(|r| r.value).collect();
    assert_eq!(values, (1..20).collect());

    let five = records.iter().find(|r| r.value == 5).unwrap();
    assert!(five.prime);
    assert!(five.tuples.contains(TupleDegree::Twin));
    assert!(five.factors.is_empty());

    let four = records.iter().find(|r| r.value == 4).unwrap();
    assert!(!four.prime);
    assert_eq!(four.factors, vec![4]);
    assert_eq!(four.factor_count, 1);
    assert!(four.tuples.is_empty());

    let seventeen = records.iter().find(|r| r.value == 17).unwrap();
    assert!(seventeen.prime);
    assert!(seventeen.tuples.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_records_for_any_worker_count() {
    let mut baseline: Option<BTreeSet<(u64, bool, Vec<u64>)>> = None;

    for workers in [1, 2, 8] {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            workers: Some(workers),
            work_capacity: 4,
            output_capacity: 4,
            ..base_config(&dir, 1, 500)
        };
        let out = json_path(&config);
        Pipeline::new(config).unwrap().run().await.unwrap();

        let records: BTreeSet<(u64, bool, Vec<u64>)> = read_json(&out)
            .into_iter()
            .map(|r| (r.value, r.prime, r.factors))
            .collect();
        assert_eq!(records.len(), 499);

        match &baseline {
            None => baseline = Some(records),
            Some(expected) => assert_eq!(&records, expected, "workers = {}", workers),
        }
    }
}

/// Classifier that stalls on a few values to force out-of-order completion
struct SlowClassifier {
    inner: NumberClassifier,
}

impl Classifier for SlowClassifier {
    fn classify(&self, candidate: Candidate) -> Record {
        if candidate.value % 7 == 0 {
            std::thread::sleep(Duration::from_millis(20));
        }
        self.inner.classify(candidate)
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ordered_output() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        workers: Some(4),
        ordered: true,
        ..base_config(&dir, 10, 60)
    };
    let out = json_path(&config);

    let classifier = Arc::new(SlowClassifier {
        inner: NumberClassifier::new(Arc::new(TupleIndex::empty())),
    });
    let summary = Pipeline::new(config)
        .unwrap()
        .run_with(classifier)
        .await
        .unwrap();
    assert_eq!(summary.written, 50);

    let values: Vec<u64> = read_json(&out).into_iter().map(|r| r.value).collect();
    assert_eq!(values, (10..60).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_tuple_file_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        tuple_files: vec![
            TupleSource::new("twin", dir.path().join("nope.txt")),
            TupleSource::new("sexy", dir.path().join("also-nope.txt")),
        ],
        ..base_config(&dir, 1, 10)
    };
    let out = json_path(&config);

    let summary = Pipeline::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.written, 9);
    assert!(read_json(&out).iter().all(|r| r.tuples.is_empty()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_pi_file_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        pi_file: Some(dir.path().join("pi.txt")),
        ..base_config(&dir, 1, 10)
    };
    let out = json_path(&config);

    Pipeline::new(config).unwrap().run().await.unwrap();
    assert!(read_json(&out).iter().all(|r| r.pi_index.is_none()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pi_index_in_output() {
    let dir = TempDir::new().unwrap();
    let pi = dir.path().join("pi.txt");
    std::fs::write(&pi, "3.14159265358979323846").unwrap();

    let config = PipelineConfig {
        pi_file: Some(pi),
        ..base_config(&dir, 1, 10)
    };
    let out = json_path(&config);

    Pipeline::new(config).unwrap().run().await.unwrap();
    let records = read_json(&out);
    let offset = |value: u64| records.iter().find(|r| r.value == value).unwrap().pi_index;
    assert_eq!(offset(3), Some(0));
    assert_eq!(offset(1), Some(1));
    assert_eq!(offset(5), Some(4));
}

#[test]
fn test_no_sink_is_config_error() {
    let config = PipelineConfig {
        silent: true,
        ..Default::default()
    };
    let err = Pipeline::new(config).err().unwrap();
    assert!(err.is_config());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unwritable_output_fails() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        // a directory cannot be opened for appending
        json: Some(dir.path().to_path_buf()),
        ..base_config(&dir, 1, 10)
    };

    let err = Pipeline::new(config).unwrap().run().await.unwrap_err();
    assert!(matches!(err, primeset_core::Error::Io(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_range() {
    let dir = TempDir::new().unwrap();
    let config = base_config(&dir, 50, 50);
    let out = json_path(&config);

    let summary = Pipeline::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.generated, 0);
    assert_eq!(summary.written, 0);
    assert_eq!(std::fs::read_to_string(out).unwrap(), "");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_csv_append_across_runs() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("out.csv");

    for (start, end) in [(1, 5), (5, 9)] {
        let config = PipelineConfig {
            json: None,
            csv: Some(csv.clone()),
            totient: TotientMode::Partial,
            ..base_config(&dir, start, end)
        };
        Pipeline::new(config).unwrap().run().await.unwrap();
    }

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], csv_header(TotientMode::Partial).join(","));
    assert_eq!(lines.len(), 9);
    assert_eq!(
        lines.iter().filter(|l| l.starts_with("value,")).count(),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_both_sinks_receive_every_record() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("out.csv");
    let config = PipelineConfig {
        csv: Some(csv.clone()),
        ..base_config(&dir, 1, 30)
    };
    let out = json_path(&config);

    let summary = Pipeline::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.written, 29);
    assert_eq!(read_json(&out).len(), 29);
    assert_eq!(std::fs::read_to_string(csv).unwrap().lines().count(), 30);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reporter_runs_alongside() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        silent: false,
        ..base_config(&dir, 1, 2_000)
    };

    let pipeline = Pipeline::new(config).unwrap();
    let telemetry = pipeline.telemetry();
    let summary = pipeline.run().await.unwrap();
    assert_eq!(telemetry.snapshot().printed, summary.written);
}

#[cfg(target_os = "linux")]
#[tokio::test(flavor = "multi_thread")]
async fn test_write_failure_mid_run_stops_pipeline() {
    let dir = TempDir::new().unwrap();

    for (json, csv) in [
        (Some(PathBuf::from("/dev/full")), None),
        (None, Some(PathBuf::from("/dev/full"))),
    ] {
        let config = PipelineConfig {
            json,
            csv,
            silent: false,
            ..base_config(&dir, 1, 200_000)
        };
        let pipeline = Pipeline::new(config).unwrap();
        let telemetry = pipeline.telemetry();

        let result = tokio::time::timeout(Duration::from_secs(30), pipeline.run())
            .await
            .expect("pipeline did not stop after a write failure");
        let err = result.unwrap_err();
        assert!(matches!(err, primeset_core::Error::Io(_)), "{:?}", err);

        // every stage, the status reporter included, has released its handle
        assert_eq!(telemetry.handles(), 1);
        assert!(telemetry.snapshot().printed < 200_000);
    }
}
