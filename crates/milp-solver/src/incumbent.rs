//! Best integral solution found so far.
//!
//! The objective of the incumbent is mirrored in an atomic so that bound
//! checks can read it without locking. The solution itself lives behind a
//! mutex, and installing a candidate compares against the locked value, so
//! two workers can never both install without one seeing the other.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::solution::Solution;

#[derive(Debug)]
pub struct Incumbent {
    /// `f64` bits of the incumbent objective, `-inf` while empty
    lower_bound: AtomicU64,
    solution: Mutex<Option<Solution>>,
}

impl Default for Incumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Incumbent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Incumbent(lower_bound: {})", self.lower_bound())
    }
}

impl Incumbent {
    pub fn new() -> Self {
        Self {
            lower_bound: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            solution: Mutex::new(None),
        }
    }

    /// Objective of the incumbent, `-inf` if there is none
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        f64::from_bits(self.lower_bound.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> Option<Solution> {
        self.solution.lock().clone()
    }

    /// Installs `candidate` if its objective is strictly greater than the
    /// current incumbent's. Returns whether it was installed.
    pub fn try_install(&self, candidate: Solution) -> bool {
        if candidate.objective_value <= self.lower_bound() {
            return false;
        }

        let mut guard = self.solution.lock();
        // The atomic may be stale, compare against the locked value
        if let Some(current) = guard.as_ref() {
            if candidate.objective_value <= current.objective_value {
                return false;
            }
        }

        self.lower_bound
            .store(candidate.objective_value.to_bits(), Ordering::Relaxed);
        *guard = Some(candidate);
        true
    }

    pub fn into_inner(self) -> Option<Solution> {
        self.solution.into_inner()
    }
}
