//! First-occurrence lookup inside the decimal expansion of π
//!
//! The digit stream is read once from a file such as `3.14159...`. Any
//! non-digit byte (the decimal point, line breaks) is dropped, so offsets
//! count digits from the leading `3`.
//!
//! Short keys are answered from a first-occurrence table filled in a single
//! pass over the stream; longer keys fall back to a substring search.

use primeset_core::{Error, Result};
use std::path::Path;
use tracing::info;

/// Longest key length served from the precomputed table
pub const DEFAULT_TABLE_DEPTH: usize = 6;

const NOT_SEEN: u64 = u64::MAX;

/// Lookup of a decimal string inside a reference digit stream
pub trait PiLookup: Send + Sync {
    /// First offset of `digits` in the stream, or `None` if it never occurs
    fn index_of(&self, digits: &str) -> Option<u64>;
}

/// In-memory digit stream with a first-occurrence table for short keys
pub struct PiDigits {
    digits: String,
    depth: usize,
    /// `first_seen[base(k) + key]` for every `k`-digit key, `k` in `1..=depth`
    first_seen: Vec<u64>,
}

impl PiDigits {
    /// Load the digit stream from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        let digits: String = raw
            .iter()
            .filter(|b| b.is_ascii_digit())
            .map(|&b| b as char)
            .collect();

        if digits.is_empty() {
            return Err(Error::input(format!(
                "no digits found in {}",
                path.display()
            )));
        }

        let pi = Self::from_digits(digits, DEFAULT_TABLE_DEPTH);
        info!(
            path = %path.display(),
            digits = pi.len(),
            table_depth = pi.depth,
            "Loaded pi digit stream"
        );
        Ok(pi)
    }

    /// Build a lookup over an already-clean digit string
    ///
    /// Non-digit characters are dropped. `depth` is capped at 9 to bound the
    /// table size.
    pub fn from_digits(digits: impl Into<String>, depth: usize) -> Self {
        let mut digits: String = digits.into();
        digits.retain(|c| c.is_ascii_digit());
        let depth = depth.min(9);

        let mut first_seen = vec![NOT_SEEN; table_base(depth + 1)];
        let bytes = digits.as_bytes();
        for start in 0..bytes.len() {
            let mut key = 0usize;
            for (len, &b) in (1..=depth).zip(&bytes[start..]) {
                key = key * 10 + (b - b'0') as usize;
                let slot = &mut first_seen[table_base(len) + key];
                if *slot == NOT_SEEN {
                    *slot = start as u64;
                }
            }
        }

        Self {
            digits,
            depth,
            first_seen,
        }
    }

    /// Number of digits in the stream
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Whether the stream is empty
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl PiLookup for PiDigits {
    fn index_of(&self, digits: &str) -> Option<u64> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        if digits.len() <= self.depth {
            let key = digits
                .bytes()
                .fold(0usize, |acc, b| acc * 10 + (b - b'0') as usize);
            let offset = self.first_seen[table_base(digits.len()) + key];
            return (offset != NOT_SEEN).then_some(offset);
        }

        self.digits.find(digits).map(|offset| offset as u64)
    }
}

/// Start of the `len`-digit section of the table: 10 + 100 + ... + 10^(len-1)
fn table_base(len: usize) -> usize {
    (1..len).map(|k| 10usize.pow(k as u32)).sum()
}
