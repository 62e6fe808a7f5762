//! Prime-tuple membership index
//!
//! Tuple files list one constellation per line, e.g. `(5, 7)` for a twin
//! pair or `(5, 7, 11, 13, 17, 19)` for a sexy group. Every member of a
//! tuple is tagged with the tuple's degree (its length).
//!
//! The index is built once, with every file scanned on its own blocking
//! thread, then frozen into an immutable [`TupleIndex`] that workers read
//! without locking.

use futures::future::join_all;
use parking_lot::Mutex;
use primeset_core::{Result, TupleDegree, TupleFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A named tuple file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleSource {
    /// Label used in logs (e.g. "twin")
    pub name: String,

    /// Path to the file
    pub path: PathBuf,
}

impl TupleSource {
    /// Create a new tuple source
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// The five constellation files shipped with the 1e9 data set
    pub fn defaults() -> Vec<Self> {
        TupleDegree::ALL
            .iter()
            .map(|d| Self::new(d.name(), format!("data/{}-1e9.txt", d.name())))
            .collect()
    }
}

/// Parse one tuple line into its members
///
/// Surrounding parentheses and whitespace are trimmed, then the line is
/// split on commas. Returns `None` for blank lines and lines with a
/// non-numeric member.
pub fn parse_tuple_line(line: &str) -> Option<Vec<u64>> {
    let inner = line.trim().trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
    if inner.is_empty() {
        return None;
    }

    inner
        .split(',')
        .map(|member| member.trim().parse::<u64>().ok())
        .collect()
}

/// Read-only map from value to the tuple degrees it belongs to
#[derive(Debug, Clone, Default)]
pub struct TupleIndex {
    entries: HashMap<u64, TupleFlags>,
}

impl TupleIndex {
    /// An index with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from tuple files, scanning all of them concurrently
    ///
    /// Missing or unreadable files are logged and skipped; the index then
    /// simply holds no entries from them.
    pub async fn build(sources: &[TupleSource]) -> Self {
        let start = Instant::now();
        let builder = TupleIndexBuilder::new();

        let scans = sources.iter().cloned().map(|source| {
            let builder = builder.clone();
            tokio::task::spawn_blocking(move || {
                let result = builder.scan_file(&source.path);
                (source, result)
            })
        });

        for joined in join_all(scans).await {
            match joined {
                Ok((source, Ok(tuples))) => {
                    debug!(
                        name = %source.name,
                        path = %source.path.display(),
                        tuples,
                        "Scanned tuple file"
                    );
                }
                Ok((source, Err(e))) => {
                    warn!(
                        name = %source.name,
                        path = %source.path.display(),
                        error = %e,
                        "Failed to read tuple file, continuing without it"
                    );
                }
                Err(e) => warn!(error = %e, "Tuple scan task failed"),
            }
        }

        let index = builder.freeze();
        info!(
            keys = index.len(),
            files = sources.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Tuple index built"
        );
        index
    }

    /// Degrees recorded for `value` (empty if absent)
    pub fn lookup(&self, value: u64) -> TupleFlags {
        self.entries.get(&value).copied().unwrap_or_default()
    }

    /// Number of distinct values in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no values
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared insertion point used while scanning tuple files
///
/// Cloning shares the underlying map. The lock is held for a single insert.
#[derive(Clone, Default)]
pub struct TupleIndexBuilder {
    entries: Arc<Mutex<HashMap<u64, TupleFlags>>>,
}

impl TupleIndexBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every member of `members` with the tuple's degree
    ///
    /// Tuples whose length is not a known degree are ignored.
    pub fn insert_tuple(&self, members: &[u64]) -> bool {
        let Some(degree) = TupleDegree::from_len(members.len()) else {
            return false;
        };

        for &member in members {
            self.entries.lock().entry(member).or_default().insert(degree);
        }
        true
    }

    /// Scan one tuple file, returning the number of tuples recorded
    pub fn scan_file(&self, path: &Path) -> Result<u64> {
        let reader = BufReader::new(File::open(path)?);
        let mut recorded = 0u64;
        let mut skipped = 0u64;

        for line in reader.lines() {
            let line = line?;
            match parse_tuple_line(&line) {
                Some(members) if self.insert_tuple(&members) => recorded += 1,
                Some(_) => skipped += 1,
                None if line.trim().is_empty() => {}
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(path = %path.display(), skipped, "Skipped malformed tuple lines");
        }
        Ok(recorded)
    }

    /// Finish the build and hand out the immutable index
    pub fn freeze(self) -> TupleIndex {
        let entries = match Arc::try_unwrap(self.entries) {
            Ok(mutex) => mutex.into_inner(),
            // A clone outlived the build; copy out what it holds
            Err(shared) => shared.lock().clone(),
        };
        TupleIndex { entries }
    }
}
