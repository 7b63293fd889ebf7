mod config;
mod cutting_plane;
mod error;
mod incumbent;
mod matrix;
mod node;
mod parallel;
mod problem;
mod search;
mod simplex;
mod solution;
mod stats;
mod strategy;
mod visited;

pub use config::{SearchConfig, SearchOrder};
pub use cutting_plane::CuttingPlaneSolver;
pub use error::{ConfigError, SolveError};
pub use incumbent::Incumbent;
pub use matrix::{Matrix, MatrixError};
pub use parallel::ParallelBranchAndBound;
pub use problem::Problem;
pub use search::{BranchAndBound, SearchOutcome};
pub use simplex::{LpStatus, SimplexSolver, Tableau};
pub use solution::{Solution, SolutionStatus};
pub use stats::SearchStatistics;
pub use strategy::{FnSolver, Solver, from_fn};
pub use visited::{Signature, VisitedSet};
