use std::sync::Arc;

use crate::error::SolveError;
use crate::problem::Problem;
use crate::solution::Solution;

/// Anything that can solve a [`Problem`].
///
/// Branch-and-bound only sees this capability, so plain simplex, the
/// cutting-plane solver, another branch-and-bound or a closure (through
/// [`from_fn`]) can all serve as its relaxation strategy.
pub trait Solver {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError>;
}

impl<S: Solver + ?Sized> Solver for &S {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        (**self).solve(problem)
    }
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        (**self).solve(problem)
    }
}

impl<S: Solver + ?Sized> Solver for Arc<S> {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        (**self).solve(problem)
    }
}

/// A [`Solver`] backed by a closure
#[derive(Debug, Clone, Copy)]
pub struct FnSolver<F>(F);

/// Wraps a closure as a [`Solver`]
pub fn from_fn<F>(f: F) -> FnSolver<F>
where
    F: Fn(&Problem) -> Result<Solution, SolveError>,
{
    FnSolver(f)
}

impl<F> Solver for FnSolver<F>
where
    F: Fn(&Problem) -> Result<Solution, SolveError>,
{
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        (self.0)(problem)
    }
}
