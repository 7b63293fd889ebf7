use clap::{Parser, Subcommand, ValueEnum};
use milp_graph::Graph;
use milp_solver::{
    BranchAndBound, CuttingPlaneSolver, ParallelBranchAndBound, Problem, SearchConfig, SearchOrder, SearchOutcome,
    SimplexSolver, SolutionStatus, Solver,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "milp")]
#[command(about = "Integer linear programming by branch-and-bound", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log every node of the search
    #[arg(long, global = true)]
    debug: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file (DIMACS graph or JSON problem)
    Solve {
        /// The file to solve
        file: PathBuf,
        /// Search configuration as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Use the parallel search
        #[arg(short, long)]
        parallel: bool,
        /// Worker threads, 0 for one per CPU (implies --parallel)
        #[arg(short, long)]
        workers: Option<usize>,
        /// Largest fractional part accepted as integral
        #[arg(short, long)]
        tolerance: Option<f64>,
        /// Frontier order
        #[arg(long, value_enum)]
        order: Option<Order>,
        /// Explore duplicate sub-problems again
        #[arg(long)]
        no_dedup: bool,
        /// Relaxation strategy
        #[arg(short, long, value_enum, default_value = "simplex")]
        strategy: Strategy,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check a DIMACS graph file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Dfs,
    Bfs,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Simplex,
    CuttingPlane,
}

/// `max c·x, A·x <= b` in plain arrays
#[derive(Deserialize)]
struct ProblemFile {
    objective: Vec<f64>,
    #[serde(default)]
    constraints: Vec<Vec<f64>>,
    #[serde(default)]
    bounds: Vec<f64>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_json);

    match cli.command {
        Commands::Solve {
            file,
            config,
            parallel,
            workers,
            tolerance,
            order,
            no_dedup,
            strategy,
            format,
        } => {
            let mut search_config = match config {
                Some(path) => {
                    let source = read_file(&path);
                    match serde_json::from_str::<SearchConfig>(&source) {
                        Ok(c) => c,
                        Err(e) => {
                            eprintln!("Invalid config: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                None => SearchConfig::default(),
            };
            if let Some(w) = workers {
                search_config.workers = w;
            }
            if let Some(t) = tolerance {
                search_config.tolerance = t;
            }
            if let Some(o) = order {
                search_config.order = match o {
                    Order::Dfs => SearchOrder::DepthFirst,
                    Order::Bfs => SearchOrder::BreadthFirst,
                };
            }
            if no_dedup {
                search_config.deduplicate = false;
            }
            search_config.debug |= cli.debug;

            let problem = load_problem(&file);
            info!(
                variables = problem.num_variables(),
                constraints = problem.num_constraints(),
                "problem loaded"
            );

            let relaxation: Box<dyn Solver + Send + Sync> = match strategy {
                Strategy::Simplex => Box::new(SimplexSolver::new()),
                Strategy::CuttingPlane => Box::new(CuttingPlaneSolver::new()),
            };

            let outcome = if parallel || workers.is_some() {
                ParallelBranchAndBound::with_config(relaxation, search_config).map(|bnb| Ok(bnb.search(&problem)))
            } else {
                BranchAndBound::with_config(relaxation, search_config).map(|bnb| bnb.search(&problem))
            };
            let outcome = match outcome {
                Ok(Ok(o)) => o,
                Ok(Err(e)) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Invalid config: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error writing output: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_outcome(&outcome);
            }

            if outcome.solution.status != SolutionStatus::Optimal {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let source = read_file(&file);
            match Graph::parse(&source) {
                Ok(graph) => {
                    println!(
                        "✓ {} is valid ({} vertices, {} edges)",
                        file.display(),
                        graph.num_vertices(),
                        graph.num_edges()
                    );
                    let isolated = graph.isolated_vertices();
                    if !isolated.is_empty() {
                        println!(
                            "  warning: {} isolated vertices, the independent set problem is unbounded",
                            isolated.len()
                        );
                    }
                }
                Err(e) => {
                    eprintln!("✗ Parse error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_logging(debug: bool, json: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

fn read_file(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    }
}

/// JSON files hold a problem, anything else is read as a DIMACS graph
fn load_problem(path: &Path) -> Problem {
    let source = read_file(path);

    if path.extension().is_some_and(|ext| ext == "json") {
        let file: ProblemFile = match serde_json::from_str(&source) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Invalid problem file: {}", e);
                std::process::exit(1);
            }
        };
        return match Problem::from_rows(&file.objective, &file.constraints, &file.bounds) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Invalid problem: {}", e);
                std::process::exit(1);
            }
        };
    }

    let graph = match Graph::parse(&source) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    };
    if !graph.isolated_vertices().is_empty() {
        warn!(
            isolated = graph.isolated_vertices().len(),
            "graph has isolated vertices, the problem is unbounded"
        );
    }
    match graph.to_problem() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Build error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_outcome(outcome: &SearchOutcome) {
    let solution = &outcome.solution;

    match solution.status {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!("Objective: {}", solution.objective_value);
            println!();
            println!("Values:");
            for (i, value) in solution.values.iter().enumerate() {
                if *value != 0.0 {
                    println!("  x{:<6} {}", i + 1, value);
                }
            }
        }
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No integral solution satisfies the constraints.");
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The objective can grow without limit.");
        }
    }

    println!();
    println!("Search: {}", outcome.statistics);
}
