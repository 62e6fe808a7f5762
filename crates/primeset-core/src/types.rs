//! Core types for the training-set generator

use serde::{Deserialize, Serialize};

/// Moduli used for the residue features (19 is absent from the historical column set)
pub const RESIDUE_MODULI: [u64; 11] = [2, 3, 5, 7, 11, 13, 17, 23, 29, 31, 37];

/// Prime landmarks bounding the partial totient buckets
pub const TOTIENT_LANDMARKS: [u64; 6] = [2, 29, 541, 7919, 104_729, 1_299_709];

/// Number of partial totient buckets
pub const PARTIAL_TOTIENT_BUCKETS: usize = TOTIENT_LANDMARKS.len() - 1;

/// A single integer waiting to be classified
///
/// Created by the generator and consumed by exactly one classifier worker,
/// which turns it into a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// The integer to classify
    pub value: u64,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

/// Size of a small prime constellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TupleDegree {
    /// Prime pairs
    Twin,
    /// Prime triplets
    Triplet,
    /// Prime quadruplets
    Quad,
    /// Prime quintuplets
    Penta,
    /// Sexy prime groups
    Sexy,
}

impl TupleDegree {
    /// All degrees in ascending tuple size
    pub const ALL: [TupleDegree; 5] = [
        TupleDegree::Twin,
        TupleDegree::Triplet,
        TupleDegree::Quad,
        TupleDegree::Penta,
        TupleDegree::Sexy,
    ];

    /// Map a tuple length to its degree
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(Self::Twin),
            3 => Some(Self::Triplet),
            4 => Some(Self::Quad),
            5 => Some(Self::Penta),
            6 => Some(Self::Sexy),
            _ => None,
        }
    }

    /// Number of members in a tuple of this degree
    pub fn len(self) -> usize {
        match self {
            Self::Twin => 2,
            Self::Triplet => 3,
            Self::Quad => 4,
            Self::Penta => 5,
            Self::Sexy => 6,
        }
    }

    /// Column name used in the output formats
    pub fn name(self) -> &'static str {
        match self {
            Self::Twin => "twin",
            Self::Triplet => "triplet",
            Self::Quad => "quad",
            Self::Penta => "penta",
            Self::Sexy => "sexy",
        }
    }

    fn bit(self) -> u8 {
        1 << (self.len() - 2)
    }
}

/// Set of tuple degrees a value participates in
///
/// Stored as a bitmask, so recording the same degree twice is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TupleFlags(u8);

impl TupleFlags {
    /// Empty set
    pub fn new() -> Self {
        Self(0)
    }

    /// Record membership in a degree
    pub fn insert(&mut self, degree: TupleDegree) {
        self.0 |= degree.bit();
    }

    /// Merge another set into this one
    pub fn union(&mut self, other: TupleFlags) {
        self.0 |= other.0;
    }

    /// Check membership in a degree
    pub fn contains(&self, degree: TupleDegree) -> bool {
        self.0 & degree.bit() != 0
    }

    /// Whether no degree is recorded
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of distinct degrees recorded
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate recorded degrees in ascending order
    pub fn iter(&self) -> impl Iterator<Item = TupleDegree> + '_ {
        TupleDegree::ALL.into_iter().filter(|d| self.contains(*d))
    }
}

impl FromIterator<TupleDegree> for TupleFlags {
    fn from_iter<I: IntoIterator<Item = TupleDegree>>(iter: I) -> Self {
        let mut flags = TupleFlags::new();
        for degree in iter {
            flags.insert(degree);
        }
        flags
    }
}

/// Flattened boolean view used by the output formats
#[derive(Serialize, Deserialize)]
struct TupleFlagFields {
    twin: bool,
    triplet: bool,
    quad: bool,
    penta: bool,
    sexy: bool,
}

impl Serialize for TupleFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TupleFlagFields {
            twin: self.contains(TupleDegree::Twin),
            triplet: self.contains(TupleDegree::Triplet),
            quad: self.contains(TupleDegree::Quad),
            penta: self.contains(TupleDegree::Penta),
            sexy: self.contains(TupleDegree::Sexy),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TupleFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = TupleFlagFields::deserialize(deserializer)?;
        let mut flags = TupleFlags::new();
        for (set, degree) in [
            (fields.twin, TupleDegree::Twin),
            (fields.triplet, TupleDegree::Triplet),
            (fields.quad, TupleDegree::Quad),
            (fields.penta, TupleDegree::Penta),
            (fields.sexy, TupleDegree::Sexy),
        ] {
            if set {
                flags.insert(degree);
            }
        }
        Ok(flags)
    }
}

/// Count of each decimal digit in a value's representation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitHistogram([u8; 10]);

impl DigitHistogram {
    /// Build the histogram of `value` written in base 10
    pub fn from_value(value: u64) -> Self {
        let mut counts = [0u8; 10];
        let mut rest = value;
        loop {
            counts[(rest % 10) as usize] += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        Self(counts)
    }

    /// Occurrences of `digit` (0-9)
    pub fn count(&self, digit: u8) -> u8 {
        self.0.get(digit as usize).copied().unwrap_or(0)
    }

    /// Sum of all counts, i.e. the decimal length of the value
    pub fn total(&self) -> u32 {
        self.0.iter().map(|&c| c as u32).sum()
    }

    /// Raw counts indexed by digit
    pub fn as_array(&self) -> &[u8; 10] {
        &self.0
    }
}

/// `value mod p` for each modulus in [`RESIDUE_MODULI`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModResidues([u8; 11]);

impl ModResidues {
    /// Compute all residues of `value`
    pub fn from_value(value: u64) -> Self {
        let mut residues = [0u8; 11];
        for (slot, modulus) in residues.iter_mut().zip(RESIDUE_MODULI) {
            // every modulus is below 256
            *slot = (value % modulus) as u8;
        }
        Self(residues)
    }

    /// Residue for a given modulus, if it is one of [`RESIDUE_MODULI`]
    pub fn get(&self, modulus: u64) -> Option<u8> {
        RESIDUE_MODULI
            .iter()
            .position(|&m| m == modulus)
            .map(|i| self.0[i])
    }

    /// Raw residues in [`RESIDUE_MODULI`] order
    pub fn as_array(&self) -> &[u8; 11] {
        &self.0
    }
}

/// Totient feature of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Totient {
    /// φ(n) over `[1, n]`
    Full(u64),

    /// Coprime counts over the landmark buckets of [`TOTIENT_LANDMARKS`]
    Partial([u64; PARTIAL_TOTIENT_BUCKETS]),
}

/// A fully classified integer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The classified integer
    pub value: u64,

    /// Primality by trial division
    pub prime: bool,

    /// Parity
    pub odd: bool,

    /// Prime-power factors in ascending prime order, empty for primes
    pub factors: Vec<u64>,

    /// Length of `factors`
    pub factor_count: usize,

    /// Full or bucketed totient
    pub totient: Totient,

    /// Prime tuple membership
    #[serde(flatten)]
    pub tuples: TupleFlags,

    /// Decimal digit histogram
    pub digits: DigitHistogram,

    /// Small-prime residues
    pub residues: ModResidues,

    /// `sin(value)` in radians
    pub sin: f64,

    /// `cos(value)` in radians
    pub cos: f64,

    /// First offset of the decimal representation inside the π digit stream
    pub pi_index: Option<u64>,

    /// Wall time spent classifying, in nanoseconds
    pub duration_ns: u64,
}
