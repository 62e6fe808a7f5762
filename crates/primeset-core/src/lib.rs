//! Primeset Core
//!
//! Core types shared across the prime training-set generator.
//!
//! This crate provides:
//! - The unit of work (`Candidate`) and the unit of output (`Record`)
//! - Feature value types (tuple flags, digit histogram, modular residues, totient)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Candidate, DigitHistogram, ModResidues, Record, Totient, TupleDegree, TupleFlags,
    PARTIAL_TOTIENT_BUCKETS, RESIDUE_MODULI, TOTIENT_LANDMARKS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Candidate, DigitHistogram, ModResidues, Record, Totient, TupleDegree, TupleFlags,
    };
}
