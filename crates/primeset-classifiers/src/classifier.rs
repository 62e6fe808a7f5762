//! Classifier trait and the default number classifier

use crate::arith::{factorize, is_prime, partial_totient, totient, PrimePower};
use crate::pi::PiLookup;
use crate::tuples::TupleIndex;
use primeset_core::{Candidate, DigitHistogram, ModResidues, Record, Totient, TupleFlags};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Trait for anything that turns a candidate into a finished record
///
/// Classification is infallible and synchronous; implementations are called
/// from dedicated worker threads.
pub trait Classifier: Send + Sync {
    /// Compute every feature of `candidate`
    fn classify(&self, candidate: Candidate) -> Record;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Which totient feature to compute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotientMode {
    /// φ(n) over `[1, n]`
    #[default]
    Full,
    /// Coprime counts over the prime landmark buckets
    Partial,
}

impl FromStr for TotientMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "partial" => Ok(Self::Partial),
            other => Err(format!("unknown totient mode '{}' (expected full or partial)", other)),
        }
    }
}

impl fmt::Display for TotientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Partial => f.write_str("partial"),
        }
    }
}

/// Trial-division classifier backed by the tuple index and an optional π lookup
#[derive(Clone)]
pub struct NumberClassifier {
    tuples: Arc<TupleIndex>,
    pi: Option<Arc<dyn PiLookup>>,
    totient_mode: TotientMode,
}

impl NumberClassifier {
    /// Create a classifier over a built tuple index
    pub fn new(tuples: Arc<TupleIndex>) -> Self {
        Self {
            tuples,
            pi: None,
            totient_mode: TotientMode::default(),
        }
    }

    /// Attach a π digit lookup
    pub fn with_pi(mut self, pi: Arc<dyn PiLookup>) -> Self {
        self.pi = Some(pi);
        self
    }

    /// Select the totient feature
    pub fn with_totient_mode(mut self, mode: TotientMode) -> Self {
        self.totient_mode = mode;
        self
    }

    /// The configured totient feature
    pub fn totient_mode(&self) -> TotientMode {
        self.totient_mode
    }

    fn totient_feature(&self, value: u64, factors: &[PrimePower]) -> Totient {
        match self.totient_mode {
            TotientMode::Full => Totient::Full(totient(value, factors)),
            TotientMode::Partial => Totient::Partial(partial_totient(value)),
        }
    }
}

impl Classifier for NumberClassifier {
    fn classify(&self, candidate: Candidate) -> Record {
        let start = Instant::now();
        let value = candidate.value;

        let prime = is_prime(value);
        let (powers, tuples) = if prime {
            (Vec::new(), self.tuples.lookup(value))
        } else {
            (factorize(value), TupleFlags::new())
        };
        let totient = self.totient_feature(value, &powers);
        let factors: Vec<u64> = powers.iter().map(PrimePower::value).collect();

        let (sin, cos) = (value as f64).sin_cos();
        let pi_index = self
            .pi
            .as_ref()
            .and_then(|pi| pi.index_of(&value.to_string()));

        Record {
            value,
            prime,
            odd: value % 2 == 1,
            factor_count: factors.len(),
            factors,
            totient,
            tuples,
            digits: DigitHistogram::from_value(value),
            residues: ModResidues::from_value(value),
            sin,
            cos,
            pi_index,
            duration_ns: start.elapsed().as_nanos() as u64,
        }
    }

    fn name(&self) -> &str {
        "trial-division"
    }
}
