use crate::error::SolveError;
use crate::matrix::{Matrix, MatrixError};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::strategy::Solver;

/// Two-phase simplex solver for the LP relaxation `max c·x, A·x <= b, x >= 0`
#[derive(Debug, Clone)]
pub struct SimplexSolver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-8,
        }
    }
}

impl SimplexSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Solve the LP relaxation of `problem`
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let mut tableau = Tableau::new(problem.constraints(), problem.bounds(), problem.objective())?;
        Ok(match self.run(&mut tableau)? {
            LpStatus::Optimal => Solution::optimal(tableau.primal_solution(), tableau.optimal_value()),
            LpStatus::Infeasible => Solution::infeasible(),
            LpStatus::Unbounded => Solution::unbounded(),
        })
    }

    /// Runs both phases on a freshly built tableau
    pub fn run(&self, tableau: &mut Tableau) -> Result<LpStatus, SolveError> {
        if !self.phase1(tableau)? {
            return Ok(LpStatus::Infeasible);
        }
        self.phase2(tableau)
    }

    fn phase1(&self, tableau: &mut Tableau) -> Result<bool, SolveError> {
        let aux_row = tableau.aux_row();
        let mut iterations = 0;

        while let Some(pivot_col) = self.find_pivot_column(tableau, aux_row) {
            // The auxiliary objective is bounded by zero, so a missing leaving
            // row can only come from round-off.
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                break;
            };
            if iterations == self.max_iterations {
                return Err(SolveError::IterationLimit {
                    phase: 1,
                    limit: self.max_iterations,
                });
            }
            self.pivot(tableau, pivot_row, pivot_col);
            iterations += 1;
        }

        // Remaining mass on the artificial variables
        let rhs_col = tableau.rhs_col();
        if tableau.data[aux_row][rhs_col] > self.tolerance {
            return Ok(false);
        }

        self.drive_out_artificials(tableau);
        Ok(true)
    }

    fn phase2(&self, tableau: &mut Tableau) -> Result<LpStatus, SolveError> {
        let obj_row = tableau.objective_row();

        for _ in 0..self.max_iterations {
            let Some(pivot_col) = self.find_pivot_column(tableau, obj_row) else {
                return Ok(LpStatus::Optimal);
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return Ok(LpStatus::Unbounded);
            };
            self.pivot(tableau, pivot_row, pivot_col);
        }

        if self.find_pivot_column(tableau, obj_row).is_none() {
            return Ok(LpStatus::Optimal);
        }
        Err(SolveError::IterationLimit {
            phase: 2,
            limit: self.max_iterations,
        })
    }

    /// Artificials still basic after phase 1 sit at zero. Pivot each one out on
    /// any non-artificial column of its row; a row without such an entry is a
    /// redundant constraint and is cleared.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let eligible = tableau.n_vars + tableau.n_constraints;

        for i in 0..tableau.n_constraints {
            let basic = tableau.basis[i];
            if !tableau.is_artificial(basic) {
                continue;
            }

            match (0..eligible).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                Some(j) => self.pivot(tableau, i, j),
                None => {
                    for row in tableau.data.iter_mut() {
                        row[basic] = 0.0;
                    }
                    tableau.data[i].fill(0.0);
                }
            }
        }
    }

    /// First column with a positive reduced cost (Bland's entering rule).
    /// Artificial columns never re-enter.
    fn find_pivot_column(&self, tableau: &Tableau, obj_row: usize) -> Option<usize> {
        let eligible = tableau.n_vars + tableau.n_constraints;
        (0..eligible).find(|&j| tableau.data[obj_row][j] > self.tolerance)
    }

    /// Minimum ratio test. Ties go to the row whose basic variable has the
    /// smallest index (Bland's leaving rule), which rules out cycling.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.n_constraints {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col] / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    let tie = (ratio - min_ratio).abs() <= self.tolerance;
                    if (!tie && ratio < min_ratio) || (tie && tableau.basis[i] < tableau.basis[row]) {
                        Some((i, ratio))
                    } else {
                        Some((row, min_ratio))
                    }
                }
            };
        }

        best.map(|(row, _)| row)
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let pivot_val = tableau.data[row][col];
        let pivot_row = tableau.data[row].clone();

        // Eliminate column in other rows
        for (i, current) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[col] / pivot_val;
            if factor == 0.0 {
                continue;
            }
            for (value, &p) in current.iter_mut().zip(&pivot_row) {
                *value -= p * factor;
            }
            current[col] = 0.0;
        }

        // Scale pivot row
        for value in tableau.data[row].iter_mut() {
            *value /= pivot_val;
        }
        tableau.data[row][col] = 1.0;

        tableau.basis[row] = col;
    }
}

impl Solver for SimplexSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        SimplexSolver::solve(self, problem)
    }
}

/// Outcome of one LP solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

/// Dense simplex tableau.
///
/// Rows are the m constraints, the phase-2 objective and the phase-1
/// auxiliary objective. Columns are the n structural variables, m slacks,
/// m artificials and the right-hand side. The objective rows hold reduced
/// costs; the negated right-hand side of the phase-2 row is the objective
/// value of the current basis.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    n_vars: usize,
    n_constraints: usize,
}

impl Tableau {
    /// Builds the phase-1 tableau for `coefficients · x <= rhs`, maximizing
    /// `objective · x`. Rows with a negative right-hand side are negated,
    /// together with their slack.
    pub fn new(coefficients: &Matrix, rhs: &[f64], objective: &[f64]) -> Result<Self, MatrixError> {
        let n_vars = objective.len();
        let n_constraints = rhs.len();
        if coefficients.num_rows() != n_constraints {
            return Err(MatrixError::DimensionMismatch {
                operation: "tableau rows",
                expected: n_constraints,
                found: coefficients.num_rows(),
            });
        }
        if n_constraints > 0 && coefficients.num_cols() != n_vars {
            return Err(MatrixError::DimensionMismatch {
                operation: "tableau columns",
                expected: n_vars,
                found: coefficients.num_cols(),
            });
        }

        let total_cols = n_vars + 2 * n_constraints + 1;
        let rhs_col = total_cols - 1;
        let mut data = vec![vec![0.0; total_cols]; n_constraints + 2];

        for (i, (row, &b)) in coefficients.rows().zip(rhs).enumerate() {
            let sign = if b < 0.0 { -1.0 } else { 1.0 };
            for (j, &a) in row.iter().enumerate() {
                data[i][j] = sign * a;
            }
            data[i][n_vars + i] = sign;
            data[i][n_vars + n_constraints + i] = 1.0;
            data[i][rhs_col] = sign * b;
        }

        data[n_constraints][..n_vars].copy_from_slice(objective);

        // Maximize minus the artificial sum; adding every constraint row
        // prices out the basic artificials.
        let aux_row = n_constraints + 1;
        for i in 0..n_constraints {
            for j in 0..n_vars + n_constraints {
                data[aux_row][j] += data[i][j];
            }
            data[aux_row][rhs_col] += data[i][rhs_col];
        }

        let basis = (0..n_constraints).map(|i| n_vars + n_constraints + i).collect();

        Ok(Self {
            data,
            basis,
            n_vars,
            n_constraints,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.n_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.n_constraints
    }

    pub fn num_columns(&self) -> usize {
        self.data[0].len()
    }

    /// Entry at `(row, col)`, `None` outside the `(m + 2) × num_columns()` tableau
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row)?.get(col).copied()
    }

    /// Unchecked entry, for callers that walk known basis rows
    pub(crate) fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub(crate) fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    /// Basic column of each constraint row
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn rhs_col(&self) -> usize {
        self.n_vars + 2 * self.n_constraints
    }

    fn objective_row(&self) -> usize {
        self.n_constraints
    }

    fn aux_row(&self) -> usize {
        self.n_constraints + 1
    }

    fn is_artificial(&self, col: usize) -> bool {
        col >= self.n_vars + self.n_constraints && col < self.rhs_col()
    }

    /// Values of the structural variables; non-basic ones are zero
    pub fn primal_solution(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; self.n_vars];
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic < self.n_vars {
                values[basic] = self.data[i][rhs_col];
            }
        }
        values
    }

    pub fn optimal_value(&self) -> f64 {
        -self.data[self.objective_row()][self.rhs_col()]
    }

    /// Shadow price of each constraint
    pub fn dual_solution(&self) -> Vec<f64> {
        let obj_row = self.objective_row();
        (0..self.n_constraints)
            // adding 0.0 turns -0.0 into 0.0
            .map(|i| -self.data[obj_row][self.n_vars + i] + 0.0)
            .collect()
    }
}
