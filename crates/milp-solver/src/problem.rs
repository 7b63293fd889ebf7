use std::fmt;

use crate::matrix::{Matrix, MatrixError};

/// An integer program in the form `max c·x  s.t.  A·x <= b,  x >= 0,  x integral`
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawProblem")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Objective coefficients, a 1×n row
    objective: Matrix,
    /// Constraint coefficients, one m×n row per inequality
    constraints: Matrix,
    /// Right-hand sides, a 1×m row
    bounds: Matrix,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawProblem {
    objective: Matrix,
    constraints: Matrix,
    bounds: Matrix,
}

#[cfg(feature = "serde")]
impl TryFrom<RawProblem> for Problem {
    type Error = MatrixError;

    fn try_from(raw: RawProblem) -> Result<Self, MatrixError> {
        Problem::new(raw.objective, raw.constraints, raw.bounds)
    }
}

impl Problem {
    pub fn new(objective: Matrix, constraints: Matrix, bounds: Matrix) -> Result<Self, MatrixError> {
        if objective.num_rows() != 1 {
            return Err(MatrixError::DimensionMismatch {
                operation: "objective rows",
                expected: 1,
                found: objective.num_rows(),
            });
        }
        if bounds.num_rows() != 1 {
            return Err(MatrixError::DimensionMismatch {
                operation: "bounds rows",
                expected: 1,
                found: bounds.num_rows(),
            });
        }
        if constraints.num_cols() != objective.num_cols() {
            return Err(MatrixError::DimensionMismatch {
                operation: "constraint columns",
                expected: objective.num_cols(),
                found: constraints.num_cols(),
            });
        }
        if constraints.num_rows() != bounds.num_cols() {
            return Err(MatrixError::DimensionMismatch {
                operation: "bounds columns",
                expected: constraints.num_rows(),
                found: bounds.num_cols(),
            });
        }
        Ok(Self {
            objective,
            constraints,
            bounds,
        })
    }

    /// Builds a problem from plain slices. An empty constraint list yields a
    /// problem with `objective.len()` variables and no rows.
    pub fn from_rows(objective: &[f64], constraints: &[Vec<f64>], bounds: &[f64]) -> Result<Self, MatrixError> {
        let constraints = if constraints.is_empty() {
            Matrix::zeros(0, objective.len())
        } else {
            Matrix::from_rows(constraints)?
        };
        Self::new(Matrix::row_vector(objective), constraints, Matrix::row_vector(bounds))
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_cols()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.num_rows()
    }

    pub fn objective(&self) -> &[f64] {
        self.objective.as_slice()
    }

    pub fn constraints(&self) -> &Matrix {
        &self.constraints
    }

    pub fn bounds(&self) -> &[f64] {
        self.bounds.as_slice()
    }

    /// Appends `coefficients · x <= bound`.
    ///
    /// Adding a (row, bound) pair that is already present is a no-op. On a
    /// length mismatch nothing is modified.
    pub fn add_constraint(&mut self, coefficients: &[f64], bound: f64) -> Result<&mut Self, MatrixError> {
        if coefficients.len() != self.num_variables() {
            return Err(MatrixError::DimensionMismatch {
                operation: "add_constraint",
                expected: self.num_variables(),
                found: coefficients.len(),
            });
        }

        let exists = self
            .constraints
            .rows()
            .zip(self.bounds())
            .any(|(row, &b)| b == bound && row == coefficients);
        if exists {
            return Ok(self);
        }

        self.constraints.push_row(coefficients)?;
        self.bounds.push_column(&[bound])?;
        Ok(self)
    }

    /// Clones the problem and appends one constraint to the copy
    pub fn with_constraint(&self, coefficients: &[f64], bound: f64) -> Result<Problem, MatrixError> {
        let mut child = self.clone();
        child.add_constraint(coefficients, bound)?;
        Ok(child)
    }

    /// Evaluates `c·x` for the given values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective().iter().zip(values).map(|(c, x)| c * x).sum()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_terms(f: &mut fmt::Formatter<'_>, coefficients: &[f64]) -> fmt::Result {
            for (j, c) in coefficients.iter().enumerate() {
                if j > 0 {
                    write!(f, " + ")?;
                }
                write!(f, "{} * x{}", c, j + 1)?;
            }
            Ok(())
        }

        write!(f, "max\t")?;
        write_terms(f, self.objective())?;
        writeln!(f)?;
        for (i, (row, bound)) in self.constraints.rows().zip(self.bounds()).enumerate() {
            write!(f, "{}\t", if i == 0 { "s.t." } else { "" })?;
            write_terms(f, row)?;
            writeln!(f, " <= {}", bound)?;
        }
        Ok(())
    }
}
