//! Gomory fractional cuts as an LP strategy.
//!
//! [`CuttingPlaneSolver`] tightens the relaxation before handing it back: as
//! long as the optimal basis has a fractional basic variable it derives a cut
//! from that tableau row, appends it to the problem and solves again.
//!
//! The cuts are only valid when every constraint coefficient and bound is an
//! integer, so that the slack variables are integral too.

use tracing::debug;

use crate::error::SolveError;
use crate::problem::Problem;
use crate::simplex::{LpStatus, SimplexSolver, Tableau};
use crate::solution::{Solution, distance_to_integer};
use crate::strategy::Solver;

#[derive(Debug, Clone)]
pub struct CuttingPlaneSolver {
    simplex: SimplexSolver,
    /// Maximum number of cuts added per solve
    max_rounds: usize,
    /// Values this close to an integer count as integral
    tolerance: f64,
}

impl Default for CuttingPlaneSolver {
    fn default() -> Self {
        Self {
            simplex: SimplexSolver::new(),
            max_rounds: 50,
            tolerance: 1e-6,
        }
    }
}

impl CuttingPlaneSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_simplex(mut self, simplex: SimplexSolver) -> Self {
        self.simplex = simplex;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solves the relaxation, adding cuts until it is integral or no new cut
    /// can be found. After `max_rounds` cuts the last relaxation is returned
    /// as is, it may still be fractional.
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let mut current = problem.clone();
        let mut round = 0;

        loop {
            let mut tableau = Tableau::new(current.constraints(), current.bounds(), current.objective())?;
            match self.simplex.run(&mut tableau)? {
                LpStatus::Infeasible => return Ok(Solution::infeasible()),
                LpStatus::Unbounded => return Ok(Solution::unbounded()),
                LpStatus::Optimal => {}
            }
            let relaxation = Solution::optimal(tableau.primal_solution(), tableau.optimal_value());

            if round == self.max_rounds {
                return Ok(relaxation);
            }
            let Some((cut, bound)) = self.gomory_cut(&tableau, &current) else {
                return Ok(relaxation);
            };
            if cut.iter().all(|&a| a == 0.0) {
                return Ok(relaxation);
            }

            let before = current.num_constraints();
            current.add_constraint(&cut, bound)?;
            if current.num_constraints() == before {
                // Same cut as last time, round-off keeps the value fractional
                return Ok(relaxation);
            }
            debug!(round, ?cut, bound, objective = relaxation.objective_value, "gomory cut added");
            round += 1;
        }
    }

    /// Fractional cut `cut · x <= bound` from the first constraint row whose
    /// basic variable is structural and fractional. `None` when the basic
    /// solution is integral.
    ///
    /// `tableau` must hold the optimal basis of `problem`.
    pub fn gomory_cut(&self, tableau: &Tableau, problem: &Problem) -> Option<(Vec<f64>, f64)> {
        let n = tableau.num_variables();
        let m = tableau.num_constraints();
        let rhs_col = tableau.rhs_col();

        let row = (0..m).find(|&i| {
            tableau.basis()[i] < n && distance_to_integer(tableau.value(i, rhs_col)) > self.tolerance
        })?;
        let source = tableau.row(row);
        let f0 = self.fraction(source[rhs_col]);

        // sum(f_j x_j) + sum(g_k s_k) >= f0 with s_k = b_k - A_k x
        let mut cut: Vec<f64> = source[..n].iter().map(|&a| -self.fraction(a)).collect();
        let mut bound = -f0;
        for (k, (coefficients, &b)) in problem.constraints().rows().zip(problem.bounds()).enumerate() {
            let g = self.fraction(source[n + k]);
            if g == 0.0 {
                continue;
            }
            for (c, &a) in cut.iter_mut().zip(coefficients) {
                *c += g * a;
            }
            bound += g * b;
        }

        for c in cut.iter_mut() {
            *c = self.snap(*c);
        }
        Some((cut, self.snap(bound)))
    }

    /// Fractional part of `value`, zero when it is within tolerance of an integer
    fn fraction(&self, value: f64) -> f64 {
        if distance_to_integer(value) <= self.tolerance {
            0.0
        } else {
            value - value.floor()
        }
    }

    fn snap(&self, value: f64) -> f64 {
        if distance_to_integer(value) <= self.tolerance {
            value.round() + 0.0
        } else {
            value
        }
    }
}

impl Solver for CuttingPlaneSolver {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        CuttingPlaneSolver::solve(self, problem)
    }
}
