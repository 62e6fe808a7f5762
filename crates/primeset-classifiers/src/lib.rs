//! Primeset Classifiers
//!
//! Feature extraction for the prime training set.
//!
//! Every integer is turned into a [`Record`](primeset_core::Record) by a
//! [`Classifier`]. The default [`NumberClassifier`] combines:
//! - Deterministic trial-division primality
//! - Prime-power factorization
//! - Full or bucketed Euler totient
//! - Prime-tuple membership from a prebuilt [`TupleIndex`]
//! - First occurrence inside the decimal expansion of π ([`PiLookup`])
//!
//! All arithmetic is fixed-width and cannot fail; only loading the lookup
//! tables touches the filesystem.

pub mod arith;
pub mod classifier;
pub mod pi;
pub mod tuples;

pub use arith::{factorize, gcd, is_prime, partial_totient, totient, totient_brute, PrimePower};
pub use classifier::{Classifier, NumberClassifier, TotientMode};
pub use pi::{PiDigits, PiLookup, DEFAULT_TABLE_DEPTH};
pub use tuples::{parse_tuple_line, TupleIndex, TupleIndexBuilder, TupleSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, NumberClassifier, TotientMode};
    pub use crate::pi::{PiDigits, PiLookup};
    pub use crate::tuples::{TupleIndex, TupleSource};
}
