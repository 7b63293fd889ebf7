//! Maximum independent set as an integer program.
//!
//! Every vertex becomes a variable with objective coefficient one and every
//! edge `{u, v}` the constraint `x_u + x_v <= 1`. An isolated vertex appears
//! in no constraint, so its variable is unbounded and so is the program.

use milp_solver::{Matrix, MatrixError, Problem};
use thiserror::Error;

use crate::graph::Graph;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Vertex {vertex} is out of range for a graph with {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl Graph {
    pub fn to_problem(&self) -> Result<Problem, BuildError> {
        let n = self.num_vertices();
        let mut constraints = Matrix::zeros(self.num_edges(), n);

        for (row, &(u, v)) in self.edges().iter().enumerate() {
            constraints.set(row, u, 1.0)?;
            // a self-loop forces 2 x_u <= 1
            let current = constraints.get(row, v)?;
            constraints.set(row, v, current + 1.0)?;
        }

        let problem = Problem::new(
            Matrix::row_vector(&vec![1.0; n]),
            constraints,
            Matrix::row_vector(&vec![1.0; self.num_edges()]),
        )?;
        Ok(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milp_solver::{BranchAndBound, ParallelBranchAndBound, SearchConfig, SimplexSolver, SolutionStatus, Solver};

    const PATH: &str = "c path on four vertices\np edge 4 3\ne 1 2\ne 2 3\ne 3 4\n";

    #[test]
    fn test_problem_shape() {
        let problem = Graph::parse(PATH).unwrap().to_problem().unwrap();

        assert_eq!(problem.num_variables(), 4);
        assert_eq!(problem.num_constraints(), 3);
        assert_eq!(problem.objective(), &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(problem.bounds(), &[1.0, 1.0, 1.0]);
        assert_eq!(problem.constraints().row(1).unwrap(), &[0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_self_loop() {
        let problem = Graph::new(1, vec![(0, 0)]).unwrap().to_problem().unwrap();
        assert_eq!(problem.constraints().row(0).unwrap(), &[2.0]);
    }

    #[test]
    fn test_independent_set_of_path() {
        let problem = Graph::parse(PATH).unwrap().to_problem().unwrap();

        let sequential = BranchAndBound::new(SimplexSolver::new()).solve(&problem).unwrap();
        let parallel = ParallelBranchAndBound::with_config(SimplexSolver::new(), SearchConfig::new().with_workers(4))
            .unwrap()
            .solve(&problem)
            .unwrap();

        assert_eq!(sequential.status, SolutionStatus::Optimal);
        assert!((sequential.objective_value - 2.0).abs() < 1e-6);
        assert!((parallel.objective_value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangle() {
        let triangle = Graph::new(3, vec![(0, 1), (1, 2), (0, 2)]).unwrap();
        let problem = triangle.to_problem().unwrap();

        let solution = BranchAndBound::new(SimplexSolver::new()).solve(&problem).unwrap();

        assert!((solution.objective_value - 1.0).abs() < 1e-6, "obj = {}", solution.objective_value);
        assert!((solution.values.iter().sum::<f64>() - 1.0).abs() < 1e-6, "values = {:?}", solution.values);
    }

    #[test]
    fn test_isolated_vertex_is_unbounded() {
        let graph = Graph::parse("p edge 3 1\ne 1 2\n").unwrap();
        let solution = BranchAndBound::new(SimplexSolver::new())
            .solve(&graph.to_problem().unwrap())
            .unwrap();
        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }
}
