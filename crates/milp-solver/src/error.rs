use thiserror::Error;

use crate::matrix::MatrixError;

/// Rejected search configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Tolerance must be >= 0, but is {0}")]
    InvalidTolerance(f64),
}

/// Failure while solving a problem.
///
/// Infeasible and unbounded problems are not errors, they are reported
/// through [`crate::SolutionStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error("Simplex phase {phase} exceeded {limit} pivots")]
    IterationLimit { phase: u8, limit: usize },
    #[error("LP strategy failed: {0}")]
    Strategy(String),
}
