use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{SearchConfig, SearchOrder};
use crate::error::{ConfigError, SolveError};
use crate::incumbent::Incumbent;
use crate::node::{self, NodeContext, NodeOutcome};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::stats::SearchStatistics;
use crate::strategy::Solver;
use crate::visited::VisitedSet;

/// Final solution of a search together with its statistics
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub solution: Solution,
    pub statistics: SearchStatistics,
}

/// Single-threaded branch-and-bound over an explicit frontier
pub struct BranchAndBound<S> {
    strategy: S,
    config: SearchConfig,
}

impl<S: Solver> BranchAndBound<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(strategy: S, config: SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { strategy, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the search to completion.
    ///
    /// An unbounded relaxation anywhere in the tree ends the search at once.
    /// Errors of the relaxation strategy are propagated.
    pub fn search(&self, problem: &Problem) -> Result<SearchOutcome, SolveError> {
        let start = Instant::now();
        let incumbent = Incumbent::new();
        let visited = VisitedSet::new();
        let ctx = NodeContext {
            config: &self.config,
            incumbent: &incumbent,
            visited: &visited,
        };
        let mut statistics = SearchStatistics::default();
        let mut frontier = VecDeque::from([problem.clone()]);

        while let Some(current) = self.pop(&mut frontier) {
            let outcome = node::explore(&self.strategy, &ctx, &current)?;
            statistics.record(outcome.event());

            match outcome {
                NodeOutcome::Unbounded => {
                    statistics.elapsed = start.elapsed();
                    info!(nodes = statistics.nodes_explored, "relaxation unbounded, stopping search");
                    return Ok(SearchOutcome {
                        solution: Solution::unbounded(),
                        statistics,
                    });
                }
                NodeOutcome::Branched(children) => frontier.extend(children),
                _ => {}
            }

            if self.config.debug {
                debug!(open = frontier.len(), visited = visited.len(), "frontier");
            }
        }

        statistics.elapsed = start.elapsed();
        let solution = incumbent.into_inner().unwrap_or_else(Solution::infeasible);
        info!(
            status = ?solution.status,
            objective = solution.objective_value,
            "branch-and-bound finished: {}",
            statistics
        );

        Ok(SearchOutcome { solution, statistics })
    }

    fn pop(&self, frontier: &mut VecDeque<Problem>) -> Option<Problem> {
        match self.config.order {
            SearchOrder::DepthFirst => frontier.pop_back(),
            SearchOrder::BreadthFirst => frontier.pop_front(),
        }
    }
}

impl<S: Solver> Solver for BranchAndBound<S> {
    fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        Ok(self.search(problem)?.solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplex::SimplexSolver;
    use crate::solution::SolutionStatus;
    use crate::strategy::from_fn;
    use std::cell::Cell;

    fn toy() -> Problem {
        Problem::from_rows(&[2.0, 3.0], &[vec![3.0, 2.0], vec![4.0, 5.0]], &[13.0, 11.0]).unwrap()
    }

    fn reddy_mikks() -> Problem {
        Problem::from_rows(
            &[5.0, 4.0],
            &[vec![6.0, 4.0], vec![1.0, 2.0], vec![-1.0, 1.0], vec![0.0, 1.0]],
            &[24.0, 6.0, 1.0, 2.0],
        )
        .unwrap()
    }

    /// `A·x <= b` and `x >= 0` up to round-off
    fn assert_feasible(problem: &Problem, values: &[f64]) {
        for (row, &b) in problem.constraints().rows().zip(problem.bounds()) {
            let lhs: f64 = row.iter().zip(values).map(|(a, x)| a * x).sum();
            assert!(lhs <= b + 1e-6, "{:?} violates {:?} <= {}", values, row, b);
        }
        assert!(values.iter().all(|&x| x >= -1e-6), "values = {:?}", values);
    }

    fn assert_solution(solution: &Solution, objective: f64, values: &[f64]) {
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(
            (solution.objective_value - objective).abs() < 1e-6,
            "obj = {} (expected {})",
            solution.objective_value,
            objective
        );
        for (got, want) in solution.values.iter().zip(values) {
            assert!((got - want).abs() < 1e-6, "values = {:?} (expected {:?})", solution.values, values);
        }
    }

    #[test]
    fn test_toy_example() {
        let bnb = BranchAndBound::new(SimplexSolver::new());
        let solution = bnb.solve(&toy()).unwrap();
        assert_solution(&solution, 6.0, &[0.0, 2.0]);
    }

    #[test]
    fn test_reddy_mikks_example() {
        let config = SearchConfig::new().with_debug(true);
        let bnb = BranchAndBound::with_config(SimplexSolver::new(), config).unwrap();
        let solution = bnb.solve(&reddy_mikks()).unwrap();
        assert_solution(&solution, 20.0, &[4.0, 0.0]);
        assert_feasible(&reddy_mikks(), &solution.values);
    }

    #[test]
    fn test_breadth_first_reaches_same_optimum() {
        for order in [SearchOrder::DepthFirst, SearchOrder::BreadthFirst] {
            for deduplicate in [true, false] {
                let config = SearchConfig::new().with_order(order).with_deduplication(deduplicate);
                let bnb = BranchAndBound::with_config(SimplexSolver::new(), config).unwrap();

                let outcome = bnb.search(&toy()).unwrap();
                assert_solution(&outcome.solution, 6.0, &[0.0, 2.0]);

                let outcome = bnb.search(&reddy_mikks()).unwrap();
                assert_solution(&outcome.solution, 20.0, &[4.0, 0.0]);
                assert_feasible(&reddy_mikks(), &outcome.solution.values);
            }
        }
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = SearchConfig::new().with_tolerance(-0.0001);
        assert!(matches!(
            BranchAndBound::with_config(SimplexSolver::new(), config),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn test_exact_integers_with_zero_tolerance() {
        let config = SearchConfig::new().with_tolerance(0.0);
        let bnb = BranchAndBound::with_config(SimplexSolver::new(), config).unwrap();

        let solution = bnb.solve(&reddy_mikks()).unwrap();

        assert!((solution.objective_value - 20.0).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!(solution.values.iter().all(|x| x - x.floor() == 0.0), "{:?}", solution.values);
        assert_feasible(&reddy_mikks(), &solution.values);
    }

    #[test]
    fn test_value_just_below_integer_is_branched() {
        // max x, 100000x <= 299999: the relaxation stops at 2.99999
        let problem = Problem::from_rows(&[1.0], &[vec![100000.0]], &[299999.0]).unwrap();
        let bnb = BranchAndBound::with_config(SimplexSolver::new(), SearchConfig::new().with_tolerance(1e-4)).unwrap();

        let outcome = bnb.search(&problem).unwrap();

        assert_solution(&outcome.solution, 2.0, &[2.0]);
        assert_feasible(&problem, &outcome.solution.values);
        assert_eq!(outcome.statistics.branched, 1);
    }

    #[test]
    fn test_integrality_of_result() {
        let tolerance = 1e-4;
        let bnb = BranchAndBound::with_config(SimplexSolver::new(), SearchConfig::new().with_tolerance(tolerance)).unwrap();
        for problem in [toy(), reddy_mikks()] {
            let solution = bnb.solve(&problem).unwrap();
            assert!(solution.values.iter().all(|x| x - x.floor() <= tolerance));
            assert_feasible(&problem, &solution.values);
        }
    }

    #[test]
    fn test_unbounded_short_circuit() {
        // max x + y, x - y <= 1
        let problem = Problem::from_rows(&[1.0, 1.0], &[vec![1.0, -1.0]], &[1.0]).unwrap();
        let calls = Cell::new(0);
        let counting = from_fn(|p: &Problem| {
            calls.set(calls.get() + 1);
            SimplexSolver::new().solve(p)
        });

        let outcome = BranchAndBound::new(counting).search(&problem).unwrap();

        assert_eq!(outcome.solution.status, SolutionStatus::Unbounded);
        assert_eq!(outcome.solution.objective_value, f64::INFINITY);
        assert!(outcome.solution.values.is_empty());
        assert_eq!(calls.get(), 1);
        assert_eq!(outcome.statistics.nodes_explored, 1);
    }

    #[test]
    fn test_infeasible_problem() {
        // x >= 5, x <= 3
        let problem = Problem::from_rows(&[1.0], &[vec![-1.0], vec![1.0]], &[-5.0, 3.0]).unwrap();

        let solution = BranchAndBound::new(SimplexSolver::new()).solve(&problem).unwrap();

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.objective_value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_integer_infeasible_problem() {
        // 2x = 1 has no integral solution although the relaxation is feasible
        let problem = Problem::from_rows(&[1.0], &[vec![2.0], vec![-2.0]], &[1.0, -1.0]).unwrap();

        let outcome = BranchAndBound::new(SimplexSolver::new()).search(&problem).unwrap();

        assert_eq!(outcome.solution.status, SolutionStatus::Infeasible);
        assert_eq!(outcome.statistics.branched, 1);
        assert_eq!(outcome.statistics.infeasible_nodes, 2);
    }

    #[test]
    fn test_strategy_error_propagates() {
        let failing = from_fn(|_: &Problem| Err(SolveError::Strategy("boom".into())));
        let result = BranchAndBound::new(failing).search(&toy());
        assert_eq!(result.unwrap_err(), SolveError::Strategy("boom".into()));
    }

    #[test]
    fn test_nested_branch_and_bound() {
        let inner = BranchAndBound::new(SimplexSolver::new());
        let outer = BranchAndBound::new(inner);
        let solution = outer.solve(&toy()).unwrap();
        assert_solution(&solution, 6.0, &[0.0, 2.0]);
    }
}
