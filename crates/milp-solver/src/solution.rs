/// The result of solving a problem or one of its relaxations
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each variable, empty unless optimal
    pub values: Vec<f64>,
    /// Objective value. `+inf` when unbounded, `-inf` when infeasible.
    pub objective_value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The objective can grow without limit
    Unbounded,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NEG_INFINITY,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::INFINITY,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// True when every fractional part `x - floor(x)` is at most `tolerance`
    pub fn is_integral(&self, tolerance: f64) -> bool {
        self.values.iter().all(|&x| x - x.floor() <= tolerance)
    }
}

/// Distance from `x` to the nearest integer
pub(crate) fn distance_to_integer(x: f64) -> f64 {
    let frac = x - x.floor();
    frac.min(1.0 - frac)
}
