//! Trial-division arithmetic
//!
//! Everything here is deliberately deterministic: no probabilistic primality
//! test is used, so a corpus regenerated on another machine is bit-identical.

use primeset_core::{PARTIAL_TOTIENT_BUCKETS, TOTIENT_LANDMARKS};

/// A prime raised to a positive exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimePower {
    /// The prime base
    pub prime: u64,

    /// Multiplicity of `prime` in the factored value
    pub exponent: u32,
}

impl PrimePower {
    /// `prime ^ exponent`
    pub fn value(&self) -> u64 {
        self.prime.pow(self.exponent)
    }
}

/// Deterministic primality by trial division up to `floor(sqrt(n))`
///
/// Values below 2 are never prime.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut divisor = 3u64;
    // `divisor <= n / divisor` avoids overflowing `divisor * divisor` near u64::MAX
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Prime factorization of `n` as ascending prime powers
///
/// Powers of two are stripped first, then odd divisors are tried in
/// increasing order. Returns an empty vector for 0, 1 and primes.
pub fn factorize(n: u64) -> Vec<PrimePower> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }

    let mut rest = n;

    let twos = rest.trailing_zeros();
    if twos > 0 {
        rest >>= twos;
        factors.push(PrimePower {
            prime: 2,
            exponent: twos,
        });
    }

    let mut divisor = 3u64;
    while divisor <= rest / divisor {
        let mut exponent = 0;
        while rest % divisor == 0 {
            rest /= divisor;
            exponent += 1;
        }
        if exponent > 0 {
            factors.push(PrimePower {
                prime: divisor,
                exponent,
            });
        }
        divisor += 2;
    }

    if rest > 1 {
        factors.push(PrimePower {
            prime: rest,
            exponent: 1,
        });
    }

    // A prime has no proper decomposition
    if factors.len() == 1 && factors[0].exponent == 1 {
        factors.clear();
    }

    factors
}

/// Greatest common divisor (Euclid)
pub fn gcd(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

/// Euler's totient of `n`, given its factorization
///
/// An empty factorization means `n` is prime (or below 2).
pub fn totient(n: u64, factors: &[PrimePower]) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ if factors.is_empty() => n - 1,
        _ => factors
            .iter()
            .fold(n, |acc, pp| acc / pp.prime * (pp.prime - 1)),
    }
}

/// Count of `i` in `[1, n]` with `gcd(i, n) == 1`, by exhaustive search
pub fn totient_brute(n: u64) -> u64 {
    (1..=n).filter(|&i| gcd(i, n) == 1).count() as u64
}

/// Coprime counts of `n` over the landmark buckets
///
/// Bucket `k` counts `i` in `[TOTIENT_LANDMARKS[k], TOTIENT_LANDMARKS[k + 1]]`
/// (both ends inclusive, so shared landmarks are counted twice) with
/// `i <= n` and `gcd(i, n) == 1`.
pub fn partial_totient(n: u64) -> [u64; PARTIAL_TOTIENT_BUCKETS] {
    let mut buckets = [0u64; PARTIAL_TOTIENT_BUCKETS];
    for (bucket, bounds) in buckets.iter_mut().zip(TOTIENT_LANDMARKS.windows(2)) {
        let (lo, hi) = (bounds[0], bounds[1].min(n));
        if lo > hi {
            continue;
        }
        *bucket = (lo..=hi).filter(|&i| gcd(i, n) == 1).count() as u64;
    }
    buckets
}
