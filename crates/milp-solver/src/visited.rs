//! Deduplication of sub-problems.
//!
//! Two branches of the tree can reach the same constraint set by adding the
//! same bounds in a different order. A [`Signature`] identifies a problem by
//! its quantized constraint rows, sorted, so both orders map to one key.
//!
//! Quantizing keeps the leading mantissa bits of each coefficient, so the key
//! has the same relative resolution at every magnitude.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::problem::Problem;

/// Magnitudes below this count as zero
const ZERO: f64 = 1e-12;

/// Low mantissa bits dropped from every coefficient, 32 of 52 remain
const DROPPED_BITS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Box<[u64]>);

impl Signature {
    pub fn of(problem: &Problem) -> Self {
        let mut rows: Vec<Vec<u64>> = problem
            .constraints()
            .rows()
            .zip(problem.bounds())
            .map(|(row, &bound)| row.iter().chain(std::iter::once(&bound)).map(|&v| quantize(v)).collect())
            .collect();
        rows.sort_unstable();
        Signature(rows.into_iter().flatten().collect())
    }
}

/// Bit pattern of `value` rounded to the nearest multiple of 2^20 ulps.
/// A mantissa carry moves into the exponent, which is the correctly rounded
/// result.
fn quantize(value: f64) -> u64 {
    if value.abs() < ZERO {
        return 0;
    }
    let half = 1u64 << (DROPPED_BITS - 1);
    let mask = !((1u64 << DROPPED_BITS) - 1);
    (value.to_bits() + half) & mask
}

/// Set of explored signatures, safe to share between workers
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<Signature>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `signature`. Returns `false` if it was already present.
    pub fn insert(&self, signature: Signature) -> bool {
        self.seen.lock().insert(signature)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
