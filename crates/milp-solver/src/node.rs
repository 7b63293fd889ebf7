use tracing::debug;

use crate::config::SearchConfig;
use crate::error::SolveError;
use crate::incumbent::Incumbent;
use crate::matrix::MatrixError;
use crate::problem::Problem;
use crate::solution::{Solution, SolutionStatus};
use crate::stats::NodeEvent;
use crate::strategy::Solver;
use crate::visited::{Signature, VisitedSet};

/// Result of processing one open sub-problem
#[derive(Debug)]
pub(crate) enum NodeOutcome {
    /// The relaxation is unbounded, so is the whole program
    Unbounded,
    Infeasible,
    Duplicate,
    PrunedByBound,
    Integral { installed: bool },
    /// `x_i <= floor(v)` and `x_i >= ceil(v)` children, minus any child
    /// identical to its parent
    Branched(Vec<Problem>),
}

impl NodeOutcome {
    pub(crate) fn event(&self) -> NodeEvent {
        match self {
            NodeOutcome::Unbounded => NodeEvent::Unbounded,
            NodeOutcome::Infeasible => NodeEvent::Infeasible,
            NodeOutcome::Duplicate => NodeEvent::Duplicate,
            NodeOutcome::PrunedByBound => NodeEvent::PrunedByBound,
            NodeOutcome::Integral { installed: true } => NodeEvent::IncumbentUpdated,
            NodeOutcome::Integral { installed: false } => NodeEvent::IntegralRejected,
            NodeOutcome::Branched(_) => NodeEvent::Branched,
        }
    }
}

/// State a node reads and updates, shared across the whole search
pub(crate) struct NodeContext<'a> {
    pub config: &'a SearchConfig,
    pub incumbent: &'a Incumbent,
    pub visited: &'a VisitedSet,
}

/// Solves the relaxation of `problem` and decides its fate.
///
/// Locks on the visited set and the incumbent are only taken after the
/// relaxation is solved and are released before returning.
pub(crate) fn explore<S>(strategy: &S, ctx: &NodeContext<'_>, problem: &Problem) -> Result<NodeOutcome, SolveError>
where
    S: Solver + ?Sized,
{
    let debug = ctx.config.debug;
    let relaxation = strategy.solve(problem)?;

    if debug {
        debug!(
            constraints = problem.num_constraints(),
            objective = relaxation.objective_value,
            values = ?relaxation.values,
            "relaxation solved"
        );
    }

    match relaxation.status {
        SolutionStatus::Unbounded => return Ok(NodeOutcome::Unbounded),
        SolutionStatus::Infeasible => return Ok(NodeOutcome::Infeasible),
        SolutionStatus::Optimal => {}
    }

    if relaxation.values.len() != problem.num_variables() {
        return Err(MatrixError::DimensionMismatch {
            operation: "relaxation values",
            expected: problem.num_variables(),
            found: relaxation.values.len(),
        }
        .into());
    }

    if ctx.config.deduplicate && !ctx.visited.insert(Signature::of(problem)) {
        if debug {
            debug!("skipping, already visited");
        }
        return Ok(NodeOutcome::Duplicate);
    }

    // Dropping integrality can only raise a maximum
    if relaxation.objective_value <= ctx.incumbent.lower_bound() {
        return Ok(NodeOutcome::PrunedByBound);
    }

    let Some(index) = branching_variable(&relaxation.values, ctx.config.tolerance) else {
        // Installed as solved, rounding could leave the feasible region
        let objective = relaxation.objective_value;
        let installed = ctx.incumbent.try_install(relaxation);
        if debug {
            debug!(objective, installed, "integral solution");
        }
        return Ok(NodeOutcome::Integral { installed });
    };

    let value = relaxation.values[index];
    if debug {
        debug!(index, value, "branching on most fractional variable");
    }

    let mut unit = vec![0.0; problem.num_variables()];
    unit[index] = 1.0;
    let down = problem.with_constraint(&unit, value.floor())?;
    unit[index] = -1.0;
    let up = problem.with_constraint(&unit, -value.ceil())?;

    // A bound that is already present would only repeat this node
    let children = [down, up]
        .into_iter()
        .filter(|child| child.num_constraints() > problem.num_constraints())
        .collect();

    Ok(NodeOutcome::Branched(children))
}

/// Index of the value with the largest fractional part `x - floor(x)`
/// above `tolerance`, the first one on ties. `None` when every value is
/// integral.
pub(crate) fn branching_variable(values: &[f64], tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (i, &x) in values.iter().enumerate() {
        let fraction = x - x.floor();
        if fraction <= tolerance {
            continue;
        }
        if best.is_none_or(|(_, f)| fraction > f) {
            best = Some((i, fraction));
        }
    }

    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplex::SimplexSolver;
    use crate::strategy::from_fn;

    fn toy() -> Problem {
        Problem::from_rows(&[2.0, 3.0], &[vec![3.0, 2.0], vec![4.0, 5.0]], &[13.0, 11.0]).unwrap()
    }

    #[test]
    fn test_branching_variable() {
        assert_eq!(branching_variable(&[0.0, 2.2], 1e-4), Some(1));
        assert_eq!(branching_variable(&[1.7, 2.2], 1e-4), Some(0));
        // ties go to the first index
        assert_eq!(branching_variable(&[0.5, 1.5], 1e-4), Some(0));
        assert_eq!(branching_variable(&[3.0, 1.0000000000000004], 1e-4), None);
        assert_eq!(branching_variable(&[3.0, 1.0000000000000004], 0.0), Some(1));
        // only the part above the floor counts, 2.99999 is far from integral
        assert_eq!(branching_variable(&[2.99999, 0.0], 1e-4), Some(0));
        assert_eq!(branching_variable(&[3.0, 1.99999, 0.5], 1e-4), Some(1));
        assert_eq!(branching_variable(&[], 0.0), None);
    }

    #[test]
    fn test_branch_children() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };

        let outcome = explore(&SimplexSolver::new(), &ctx, &toy()).unwrap();

        let NodeOutcome::Branched(children) = outcome else {
            panic!("expected branching, got {:?}", outcome);
        };
        let [down, up] = children.as_slice() else {
            panic!("expected two children, got {}", children.len());
        };
        assert_eq!(down.constraints().row(2).unwrap(), &[0.0, 1.0]);
        assert_eq!(down.bounds()[2], 2.0);
        assert_eq!(up.constraints().row(2).unwrap(), &[0.0, -1.0]);
        assert_eq!(up.bounds()[2], -3.0);
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_duplicate_and_bound_pruning() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let simplex = SimplexSolver::new();

        assert!(matches!(explore(&simplex, &ctx, &toy()).unwrap(), NodeOutcome::Branched(_)));
        assert!(matches!(explore(&simplex, &ctx, &toy()).unwrap(), NodeOutcome::Duplicate));

        incumbent.try_install(Solution::optimal(vec![0.0, 2.0], 6.6));
        let other = toy().with_constraint(&[1.0, 0.0], 5.0).unwrap();
        assert!(matches!(explore(&simplex, &ctx, &other).unwrap(), NodeOutcome::PrunedByBound));
    }

    #[test]
    fn test_integral_solution_is_installed_as_solved() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let strategy = from_fn(|_: &Problem| Ok(Solution::optimal(vec![0.00001, 2.00002], 6.00008)));

        let outcome = explore(&strategy, &ctx, &toy()).unwrap();

        assert!(matches!(outcome, NodeOutcome::Integral { installed: true }));
        let best = incumbent.snapshot().unwrap();
        assert_eq!(best.values, vec![0.00001, 2.00002]);
        assert_eq!(best.objective_value, 6.00008);
    }

    #[test]
    fn test_just_below_an_integer_branches() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let strategy = from_fn(|_: &Problem| Ok(Solution::optimal(vec![0.0, 2.99999], 8.99997)));

        let NodeOutcome::Branched(children) = explore(&strategy, &ctx, &toy()).unwrap() else {
            panic!("expected branching");
        };
        assert_eq!(children[0].bounds()[2], 2.0);
        assert_eq!(children[1].bounds()[2], -3.0);
        assert!(incumbent.snapshot().is_none());
    }

    #[test]
    fn test_zero_tolerance_requires_exact_integers() {
        let config = SearchConfig::new().with_tolerance(0.0);
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let noisy = from_fn(|_: &Problem| Ok(Solution::optimal(vec![3.0, 1.0000000000000004], 19.0)));
        assert!(matches!(explore(&noisy, &ctx, &toy()).unwrap(), NodeOutcome::Branched(_)));
        assert!(incumbent.snapshot().is_none());

        let exact = from_fn(|_: &Problem| Ok(Solution::optimal(vec![3.0, 1.0], 19.0)));
        let other = toy().with_constraint(&[1.0, 1.0], 10.0).unwrap();
        assert!(matches!(explore(&exact, &ctx, &other).unwrap(), NodeOutcome::Integral { installed: true }));
    }

    #[test]
    fn test_existing_bound_is_not_repeated() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        // y <= 2 is already present, only the y >= 3 child is new
        let problem = toy().with_constraint(&[0.0, 1.0], 2.0).unwrap();
        let strategy = from_fn(|_: &Problem| Ok(Solution::optimal(vec![0.0, 2.5], 7.5)));

        let NodeOutcome::Branched(children) = explore(&strategy, &ctx, &problem).unwrap() else {
            panic!("expected branching");
        };
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].bounds()[3], -3.0);
    }

    #[test]
    fn test_wrong_length_relaxation_is_an_error() {
        let config = SearchConfig::default();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let strategy = from_fn(|_: &Problem| Ok(Solution::optimal(vec![0.5], 1.0)));

        assert!(explore(&strategy, &ctx, &toy()).is_err());
    }
}
