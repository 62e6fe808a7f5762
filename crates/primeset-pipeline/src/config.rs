//! Pipeline configuration

use primeset_classifiers::{TotientMode, TupleSource};
use primeset_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hint shown when no output sink is configured
pub const MISSING_SINK_HINT: &str = "Must use either --json or --csv flag. (e.g. --csv=test.csv)";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// First value classified
    #[serde(default = "default_start")]
    pub start: u64,

    /// Exclusive upper bound of the range
    #[serde(default = "default_end")]
    pub end: u64,

    /// Classifier worker count (defaults to the CPU count, halved with π lookup)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Capacity of the generator → worker channel
    #[serde(default = "default_work_capacity")]
    pub work_capacity: usize,

    /// Capacity of the worker → writer channel
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,

    /// Latency samples kept by the moving average
    #[serde(default = "default_window")]
    pub moving_average_window: usize,

    /// Seconds between status lines
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,

    /// Totient feature to compute
    #[serde(default)]
    pub totient: TotientMode,

    /// Emit records in input order
    #[serde(default)]
    pub ordered: bool,

    /// Prime-tuple files feeding the tuple index
    #[serde(default = "TupleSource::defaults")]
    pub tuple_files: Vec<TupleSource>,

    /// Digit stream of π; no π lookup when unset
    #[serde(default)]
    pub pi_file: Option<PathBuf>,

    /// JSON-lines output path
    #[serde(default)]
    pub json: Option<PathBuf>,

    /// CSV output path
    #[serde(default)]
    pub csv: Option<PathBuf>,

    /// Suppress status reporting
    #[serde(default)]
    pub silent: bool,
}

impl PipelineConfig {
    /// Load configuration from a YAML file, or defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.json.is_none() && self.csv.is_none() {
            return Err(Error::config(MISSING_SINK_HINT));
        }
        if self.start > self.end {
            return Err(Error::config(format!(
                "start ({}) must not exceed end ({})",
                self.start, self.end
            )));
        }
        if self.workers == Some(0) {
            return Err(Error::config("workers must be at least 1"));
        }
        if self.work_capacity == 0 || self.output_capacity == 0 {
            return Err(Error::config("channel capacities must be at least 1"));
        }
        if self.moving_average_window == 0 {
            return Err(Error::config("moving_average_window must be at least 1"));
        }
        if !self.silent && self.status_interval_secs == 0 {
            return Err(Error::config("status_interval_secs must be at least 1"));
        }
        Ok(())
    }

    /// Worker count after applying the CPU-based default
    pub fn resolved_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            let cpus = num_cpus::get();
            if self.pi_file.is_some() {
                // leave headroom for the memory-bound π lookups
                (cpus / 2).max(1)
            } else {
                cpus.max(1)
            }
        })
    }

    /// Interval between status lines
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    /// Number of values in the configured range
    pub fn range_len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            workers: None,
            work_capacity: default_work_capacity(),
            output_capacity: default_output_capacity(),
            moving_average_window: default_window(),
            status_interval_secs: default_status_interval(),
            totient: TotientMode::default(),
            ordered: false,
            tuple_files: TupleSource::defaults(),
            pi_file: None,
            json: None,
            csv: None,
            silent: false,
        }
    }
}

fn default_start() -> u64 {
    1
}

fn default_end() -> u64 {
    1_000_000_000
}

fn default_work_capacity() -> usize {
    1024
}

fn default_output_capacity() -> usize {
    10_000
}

fn default_window() -> usize {
    100
}

fn default_status_interval() -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_json() -> PipelineConfig {
        PipelineConfig {
            json: Some(PathBuf::from("out.jsonl")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.start, 1);
        assert_eq!(config.end, 1_000_000_000);
        assert_eq!(config.tuple_files.len(), 5);
        assert_eq!(config.totient, TotientMode::Full);
        assert!(!config.ordered);
    }

    #[test]
    fn test_requires_a_sink() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("--json or --csv"));

        assert!(with_json().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let inverted = PipelineConfig {
            start: 10,
            end: 5,
            ..with_json()
        };
        assert!(inverted.validate().is_err());

        let no_workers = PipelineConfig {
            workers: Some(0),
            ..with_json()
        };
        assert!(no_workers.validate().is_err());

        let no_capacity = PipelineConfig {
            output_capacity: 0,
            ..with_json()
        };
        assert!(no_capacity.validate().is_err());

        let empty_range = PipelineConfig {
            start: 7,
            end: 7,
            ..with_json()
        };
        assert!(empty_range.validate().is_ok());
        assert_eq!(empty_range.range_len(), 0);
    }

    #[test]
    fn test_worker_default_halved_with_pi() {
        let plain = with_json();
        let with_pi = PipelineConfig {
            pi_file: Some(PathBuf::from("pi.txt")),
            ..with_json()
        };
        assert!(plain.resolved_workers() >= 1);
        assert!(with_pi.resolved_workers() >= 1);
        assert!(with_pi.resolved_workers() <= plain.resolved_workers());

        let explicit = PipelineConfig {
            workers: Some(3),
            ..with_pi
        };
        assert_eq!(explicit.resolved_workers(), 3);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "start: 100\nend: 200\ntotient: partial\ncsv: out.csv\ntuple_files:\n  - name: twin\n    path: twins.txt\n"
        )
        .unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.start, 100);
        assert_eq!(config.end, 200);
        assert_eq!(config.totient, TotientMode::Partial);
        assert_eq!(config.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(config.tuple_files, vec![TupleSource::new("twin", "twins.txt")]);
        assert_eq!(config.output_capacity, 10_000);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = PipelineConfig::load("/definitely/not/here.yaml").unwrap();
        assert_eq!(config.start, 1);
    }
}
